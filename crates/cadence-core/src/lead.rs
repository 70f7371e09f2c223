//! Lead — the dialable entity tracked through the calling lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{outcome::Outcome, region::Region};

/// Attempt ceiling applied when a lead doesn't carry its own.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a lead sits in the calling lifecycle.
///
/// `InProgress` is set by the dial surface while a call is live (through the
/// administrative patch); the disposition engine never produces it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadStatus {
  /// Eligible for dialing.
  Queued,
  /// A call is currently being placed or is live.
  InProgress,
  /// A follow-up time was promised.
  Callback,
  /// Terminal: definitively resolved (demo booked, not interested, wrong
  /// number).
  Completed,
  /// Terminal: attempts exhausted without resolution.
  Archived,
}

// ─── Lead ────────────────────────────────────────────────────────────────────

/// A dialable prospect record.
///
/// Contact fields change only through administrative edits; scheduling
/// fields (`status`, `attempt_count`, `next_call_at`, ...) only through the
/// disposition engine. Leads are never hard-deleted — `Archived` is a
/// status, not a removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
  pub lead_id:        Uuid,
  pub business_name:  String,
  pub contact_name:   Option<String>,
  /// E.164; required for dialing.
  pub phone:          String,
  pub website:        Option<String>,
  /// Two-letter US state code; drives caller-ID locality matching.
  pub state:          Option<String>,
  pub region:         Option<Region>,
  pub status:         LeadStatus,
  pub attempt_count:  u32,
  pub max_attempts:   u32,
  /// When the lead becomes eligible again; `None` means no schedule.
  pub next_call_at:   Option<DateTime<Utc>>,
  pub last_called_at: Option<DateTime<Utc>>,
  pub last_outcome:   Option<Outcome>,
  pub demo_booked:    bool,
  pub demo_date:      Option<DateTime<Utc>>,
  pub not_interested: bool,
  pub wrong_number:   bool,
  /// Append-only outcome log, one `[YYYY-MM-DD] outcome: note` line per
  /// disposition. Never rewritten.
  pub notes:          String,
  pub created_at:     DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::DialerStore::add_lead`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewLead {
  pub business_name: String,
  pub phone:         String,
  pub contact_name:  Option<String>,
  pub website:       Option<String>,
  pub state:         Option<String>,
  /// Defaults to the state's region when a state is given.
  pub region:        Option<Region>,
  pub max_attempts:  Option<u32>,
}

impl NewLead {
  /// Convenience constructor with all optional fields unset.
  pub fn new(business_name: impl Into<String>, phone: impl Into<String>) -> Self {
    Self {
      business_name: business_name.into(),
      phone:         phone.into(),
      contact_name:  None,
      website:       None,
      state:         None,
      region:        None,
      max_attempts:  None,
    }
  }
}

/// Administrative edit of contact fields, plus the status toggle the dial
/// surface uses to mark a lead `in_progress`. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct LeadPatch {
  pub business_name: Option<String>,
  pub contact_name:  Option<String>,
  pub phone:         Option<String>,
  pub website:       Option<String>,
  pub state:         Option<String>,
  pub region:        Option<Region>,
  pub status:        Option<LeadStatus>,
  pub max_attempts:  Option<u32>,
}

/// Parameters for [`crate::store::DialerStore::list_leads`].
#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
  pub status: Option<LeadStatus>,
  pub region: Option<Region>,
  /// Substring match over business name and phone.
  pub text:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}
