//! Immutable per-dial history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::Outcome;

/// One disposition event — the audit trail of record.
/// Once written, no field is ever updated and no row is ever deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallHistoryEntry {
  pub entry_id:       Uuid,
  pub lead_id:        Uuid,
  /// 1-based; mirrors the lead's `attempt_count` after the event.
  pub attempt_number: u32,
  pub outcome:        Outcome,
  pub notes:          Option<String>,
  pub demo_date:      Option<DateTime<Utc>>,
  pub callback_at:    Option<DateTime<Utc>>,
  /// Server-assigned; never changes after creation.
  pub recorded_at:    DateTime<Utc>,
}
