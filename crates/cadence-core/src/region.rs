//! Calling regions — coarse US timezone buckets.
//!
//! The dial floor works one region at a time so calls land inside the
//! prospect's business hours. The schedule is a static hour-to-region table
//! evaluated in a fixed reference zone.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Offset of the reference zone (US Eastern standard) from UTC, in hours.
/// A tz database would buy DST correctness at the cost of a dependency; the
/// one-hour summer skew only shifts the calling window, never past it.
const REFERENCE_OFFSET_HOURS: i32 = -5;

/// A coarse continental-US timezone bucket.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
  Eastern,
  Central,
  Mountain,
  Pacific,
}

impl Region {
  pub const ALL: [Region; 4] =
    [Region::Eastern, Region::Central, Region::Mountain, Region::Pacific];

  /// The region whose business hours the floor should be working right now,
  /// sweeping west over the day. Outside the window no region resolves and
  /// the queue is served unfiltered.
  pub fn on_the_clock(now: DateTime<Utc>) -> Option<Region> {
    match reference_hour(now) {
      9 | 10 => Some(Region::Eastern),
      11 | 12 => Some(Region::Central),
      13 | 14 => Some(Region::Mountain),
      15..=17 => Some(Region::Pacific),
      _ => None,
    }
  }

  /// Map a two-letter US state code to its dominant calling region.
  /// Unknown or non-US codes resolve to `None`.
  pub fn from_state(code: &str) -> Option<Region> {
    match code.to_ascii_uppercase().as_str() {
      "CT" | "DC" | "DE" | "FL" | "GA" | "IN" | "KY" | "MA" | "MD" | "ME"
      | "MI" | "NC" | "NH" | "NJ" | "NY" | "OH" | "PA" | "RI" | "SC" | "VA"
      | "VT" | "WV" => Some(Region::Eastern),
      "AL" | "AR" | "IA" | "IL" | "KS" | "LA" | "MN" | "MO" | "MS" | "ND"
      | "NE" | "OK" | "SD" | "TN" | "TX" | "WI" => Some(Region::Central),
      "AZ" | "CO" | "ID" | "MT" | "NM" | "UT" | "WY" => Some(Region::Mountain),
      "AK" | "CA" | "HI" | "NV" | "OR" | "WA" => Some(Region::Pacific),
      _ => None,
    }
  }
}

/// Hour of day (0-23) in the reference zone. Also used to bucket the hourly
/// stats breakdown so it lines up with the calling schedule.
pub fn reference_hour(t: DateTime<Utc>) -> u32 {
  (t.hour() as i32 + REFERENCE_OFFSET_HOURS).rem_euclid(24) as u32
}
