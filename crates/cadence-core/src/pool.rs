//! Outbound caller-ID pool — records and the rotation/selection policy.
//!
//! Rotating the outbound number and capping its hourly usage keeps the pool
//! from tripping carrier spam heuristics. Counter resets are driven from
//! outside (an hourly trigger); this module only defines the records, the
//! thresholds, and the pure selection heuristic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Hourly dial ceiling applied when a number doesn't carry its own.
pub const DEFAULT_MAX_CALLS_PER_HOUR: u32 = 20;

/// Informational cooldown length; the actual cooldown is realised by the
/// `Cooling` status until the next hourly reset.
pub const DEFAULT_COOLDOWN_MINUTES: u32 = 30;

/// More spam reports than this and the number is pulled for good.
pub const SPAM_REPORT_LIMIT: u32 = 2;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle of a pool number.
///
/// `Active` → (hourly cap hit) → `Cooling` → (hourly reset or manual
/// reactivate) → `Active`; spam past the limit or a manual retire forces
/// `Retired`, terminal unless manually reactivated.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PoolStatus {
  Active,
  Cooling,
  Retired,
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One managed outbound caller ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
  pub number_id:          Uuid,
  /// E.164; unique across the pool.
  pub phone_number:       String,
  pub label:              Option<String>,
  pub area_code:          Option<String>,
  /// Two-letter US state code; drives the locality-matching heuristic.
  pub state:              Option<String>,
  /// The telephony provider's identifier for this number.
  pub provider_sid:       Option<String>,
  pub status:             PoolStatus,
  pub calls_this_hour:    u32,
  pub calls_today:        u32,
  pub total_calls:        u32,
  pub max_calls_per_hour: u32,
  pub cooldown_minutes:   u32,
  pub spam_reports:       u32,
  pub last_used_at:       Option<DateTime<Utc>>,
  pub created_at:         DateTime<Utc>,
}

impl PoolEntry {
  /// Eligible to place the next call right now.
  pub fn available(&self) -> bool {
    self.status == PoolStatus::Active && self.calls_this_hour < self.max_calls_per_hour
  }
}

/// Input to [`crate::store::DialerStore::add_number`].
#[derive(Debug, Clone)]
pub struct NewPoolEntry {
  pub phone_number:       String,
  pub label:              Option<String>,
  pub area_code:          Option<String>,
  pub state:              Option<String>,
  pub provider_sid:       Option<String>,
  pub max_calls_per_hour: Option<u32>,
  pub cooldown_minutes:   Option<u32>,
}

impl NewPoolEntry {
  pub fn new(phone_number: impl Into<String>) -> Self {
    Self {
      phone_number:       phone_number.into(),
      label:              None,
      area_code:          None,
      state:              None,
      provider_sid:       None,
      max_calls_per_hour: None,
      cooldown_minutes:   None,
    }
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Pick the caller ID for the next dial.
///
/// Among available numbers, prefer one registered in the lead's state —
/// local caller IDs answer measurably better — and otherwise balance load
/// onto the number with the fewest calls this hour. `None` means the pool
/// has nothing eligible and the caller must fall back to an unmanaged dial
/// path.
pub fn select_number<'a>(
  pool:       &'a [PoolEntry],
  lead_state: Option<&str>,
) -> Option<&'a PoolEntry> {
  let available: Vec<&PoolEntry> = pool.iter().filter(|n| n.available()).collect();

  if let Some(state) = lead_state {
    if let Some(local) = available
      .iter()
      .find(|n| n.state.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(state)))
    {
      return Some(local);
    }
  }

  available.into_iter().min_by_key(|n| n.calls_this_hour)
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn entry(state: &str, status: PoolStatus, calls_this_hour: u32) -> PoolEntry {
    PoolEntry {
      number_id:          Uuid::new_v4(),
      phone_number:       format!("+1212555{calls_this_hour:04}"),
      label:              None,
      area_code:          None,
      state:              Some(state.into()),
      provider_sid:       None,
      status,
      calls_this_hour,
      calls_today:        calls_this_hour,
      total_calls:        calls_this_hour,
      max_calls_per_hour: DEFAULT_MAX_CALLS_PER_HOUR,
      cooldown_minutes:   DEFAULT_COOLDOWN_MINUTES,
      spam_reports:       0,
      last_used_at:       None,
      created_at:         Utc::now(),
    }
  }

  #[test]
  fn prefers_locality_over_load() {
    let pool = vec![
      entry("TX", PoolStatus::Active, 1),
      entry("NY", PoolStatus::Active, 15),
    ];
    let picked = select_number(&pool, Some("ny")).unwrap();
    assert_eq!(picked.state.as_deref(), Some("NY"));
  }

  #[test]
  fn falls_back_to_least_used() {
    let pool = vec![
      entry("TX", PoolStatus::Active, 7),
      entry("FL", PoolStatus::Active, 2),
      entry("CA", PoolStatus::Active, 12),
    ];
    let picked = select_number(&pool, Some("WY")).unwrap();
    assert_eq!(picked.calls_this_hour, 2);

    let picked = select_number(&pool, None).unwrap();
    assert_eq!(picked.calls_this_hour, 2);
  }

  #[test]
  fn skips_cooling_retired_and_capped() {
    let mut capped = entry("NY", PoolStatus::Active, DEFAULT_MAX_CALLS_PER_HOUR);
    capped.max_calls_per_hour = DEFAULT_MAX_CALLS_PER_HOUR;
    let pool = vec![
      entry("NY", PoolStatus::Cooling, 0),
      entry("NY", PoolStatus::Retired, 0),
      capped,
      entry("TX", PoolStatus::Active, 5),
    ];
    let picked = select_number(&pool, Some("NY")).unwrap();
    // The only eligible number is the Texas one, locality notwithstanding.
    assert_eq!(picked.state.as_deref(), Some("TX"));
  }

  #[test]
  fn empty_or_exhausted_pool_selects_nothing() {
    assert!(select_number(&[], Some("NY")).is_none());
    let pool = vec![entry("NY", PoolStatus::Cooling, 0)];
    assert!(select_number(&pool, None).is_none());
  }
}
