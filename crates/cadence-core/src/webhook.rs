//! Normalization of telephony-provider webhook events.
//!
//! The provider posts call lifecycle updates asynchronously; they land in
//! the call log keyed by the provider's call SID and never drive lead
//! transitions. The mapping is tolerant: unknown vocabulary is dropped by
//! the receiver (logged, acknowledged), never bounced back at the provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Internal call-log status vocabulary.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CallLogStatus {
  Initiated,
  Ringing,
  InProgress,
  Completed,
  Busy,
  NoAnswer,
  Failed,
  Canceled,
}

/// Map a provider status string onto the internal vocabulary.
/// `None` for anything unrecognised.
pub fn normalize_status(provider: &str) -> Option<CallLogStatus> {
  match provider {
    "queued" | "initiated" => Some(CallLogStatus::Initiated),
    "ringing" => Some(CallLogStatus::Ringing),
    "answered" | "in-progress" => Some(CallLogStatus::InProgress),
    "completed" => Some(CallLogStatus::Completed),
    "busy" => Some(CallLogStatus::Busy),
    "no-answer" => Some(CallLogStatus::NoAnswer),
    "failed" => Some(CallLogStatus::Failed),
    "canceled" => Some(CallLogStatus::Canceled),
    _ => None,
  }
}

/// One normalized provider event, ready to upsert.
#[derive(Debug, Clone)]
pub struct CallEvent {
  pub call_sid:      String,
  pub status:        CallLogStatus,
  pub from_number:   Option<String>,
  pub to_number:     Option<String>,
  pub duration_secs: Option<u32>,
  pub occurred_at:   DateTime<Utc>,
}

/// A call-log row as stored. `started_at` is fixed by the first event for
/// the SID; later events only advance `status`, `duration_secs` and
/// `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
  pub call_sid:      String,
  pub status:        CallLogStatus,
  pub from_number:   Option<String>,
  pub to_number:     Option<String>,
  pub duration_secs: Option<u32>,
  pub started_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn provider_vocabulary_maps() {
    assert_eq!(normalize_status("queued"), Some(CallLogStatus::Initiated));
    assert_eq!(normalize_status("initiated"), Some(CallLogStatus::Initiated));
    assert_eq!(normalize_status("ringing"), Some(CallLogStatus::Ringing));
    assert_eq!(normalize_status("answered"), Some(CallLogStatus::InProgress));
    assert_eq!(normalize_status("in-progress"), Some(CallLogStatus::InProgress));
    assert_eq!(normalize_status("completed"), Some(CallLogStatus::Completed));
    assert_eq!(normalize_status("busy"), Some(CallLogStatus::Busy));
    assert_eq!(normalize_status("no-answer"), Some(CallLogStatus::NoAnswer));
    assert_eq!(normalize_status("failed"), Some(CallLogStatus::Failed));
    assert_eq!(normalize_status("canceled"), Some(CallLogStatus::Canceled));
  }

  #[test]
  fn unknown_vocabulary_is_dropped() {
    assert_eq!(normalize_status("machine-detected"), None);
    assert_eq!(normalize_status(""), None);
    // The mapping is exact, not case-folded: providers document lowercase.
    assert_eq!(normalize_status("Completed"), None);
  }
}
