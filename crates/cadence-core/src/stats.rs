//! Daily roll-up counters and read-side aggregations.
//!
//! One row per calendar date, written only through the atomic
//! increment/upsert contract of [`crate::store::DialerStore::increment_stats`].
//! Everything derived (rolling windows, rates, hourly breakdown) is computed
//! on read and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{history::CallHistoryEntry, outcome::Outcome, region};

// ─── Stored row ──────────────────────────────────────────────────────────────

/// Counters for one calendar date. Monotonic within the day; this subsystem
/// never decrements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
  pub date:          NaiveDate,
  pub total_dials:   u64,
  pub contacts:      u64,
  pub conversations: u64,
  pub demos_booked:  u64,
  pub demos_held:    u64,
  pub deals_closed:  u64,
  pub hours_dialed:  f64,
}

impl DailyStats {
  /// A zero row for `date` — what an upsert starts from.
  pub fn empty(date: NaiveDate) -> Self {
    Self {
      date,
      total_dials: 0,
      contacts: 0,
      conversations: 0,
      demos_booked: 0,
      demos_held: 0,
      deals_closed: 0,
      hours_dialed: 0.0,
    }
  }
}

// ─── Increment contract ──────────────────────────────────────────────────────

/// Increments applied to one date row in a single atomic upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsDelta {
  #[serde(default)]
  pub total_dials:   u64,
  #[serde(default)]
  pub contacts:      u64,
  #[serde(default)]
  pub conversations: u64,
  #[serde(default)]
  pub demos_booked:  u64,
  #[serde(default)]
  pub demos_held:    u64,
  #[serde(default)]
  pub deals_closed:  u64,
  #[serde(default)]
  pub hours_dialed:  f64,
}

impl StatsDelta {
  /// The increments one disposition event contributes. `demos_held`,
  /// `deals_closed` and `hours_dialed` only move through the administrative
  /// adjust path.
  pub fn for_outcome(outcome: Outcome) -> Self {
    Self {
      total_dials:   1,
      contacts:      outcome.contact_made() as u64,
      conversations: outcome.is_conversation() as u64,
      demos_booked:  (outcome == Outcome::DemoBooked) as u64,
      ..Self::default()
    }
  }
}

// ─── Rolling window ──────────────────────────────────────────────────────────

/// Aggregation over the most recent N calendar-date rows that actually
/// exist — dates without a row contribute nothing and are not zero-padded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingStats {
  pub days_with_data:    u32,
  pub total_dials:       u64,
  pub contacts:          u64,
  pub conversations:     u64,
  pub demos_booked:      u64,
  pub demos_held:        u64,
  pub deals_closed:      u64,
  pub hours_dialed:      f64,
  /// contacts / total_dials.
  pub contact_rate:      f64,
  /// conversations / contacts.
  pub conversation_rate: f64,
  /// demos_booked / conversations.
  pub demo_rate:         f64,
  /// deals_closed / demos_booked.
  pub close_rate:        f64,
}

impl RollingStats {
  pub fn from_rows(rows: &[DailyStats]) -> Self {
    let total_dials: u64 = rows.iter().map(|d| d.total_dials).sum();
    let contacts: u64 = rows.iter().map(|d| d.contacts).sum();
    let conversations: u64 = rows.iter().map(|d| d.conversations).sum();
    let demos_booked: u64 = rows.iter().map(|d| d.demos_booked).sum();
    let demos_held: u64 = rows.iter().map(|d| d.demos_held).sum();
    let deals_closed: u64 = rows.iter().map(|d| d.deals_closed).sum();
    let hours_dialed: f64 = rows.iter().map(|d| d.hours_dialed).sum();

    Self {
      days_with_data: rows.len() as u32,
      total_dials,
      contacts,
      conversations,
      demos_booked,
      demos_held,
      deals_closed,
      hours_dialed,
      contact_rate: rate(contacts, total_dials),
      conversation_rate: rate(conversations, contacts),
      demo_rate: rate(demos_booked, conversations),
      close_rate: rate(deals_closed, demos_booked),
    }
  }
}

/// `0.0` on a zero denominator — rates are never NaN and never an error.
fn rate(numerator: u64, denominator: u64) -> f64 {
  if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

// ─── Hourly breakdown ────────────────────────────────────────────────────────

/// Dials bucketed by hour of day in the reference zone, so the breakdown
/// lines up with the calling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyBucket {
  /// 0-23, reference zone.
  pub hour:         u32,
  pub dials:        u64,
  pub contacts:     u64,
  pub contact_rate: f64,
}

/// Bucket history entries by their recorded hour. Hours with no dials are
/// omitted.
pub fn hourly_breakdown(entries: &[CallHistoryEntry]) -> Vec<HourlyBucket> {
  let mut dials = [0u64; 24];
  let mut contacts = [0u64; 24];

  for entry in entries {
    let hour = region::reference_hour(entry.recorded_at) as usize;
    dials[hour] += 1;
    contacts[hour] += entry.outcome.contact_made() as u64;
  }

  (0..24)
    .filter(|&h| dials[h] > 0)
    .map(|h| HourlyBucket {
      hour:         h as u32,
      dials:        dials[h],
      contacts:     contacts[h],
      contact_rate: rate(contacts[h], dials[h]),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  use super::*;

  fn day(date: &str, dials: u64, contacts: u64, convos: u64, demos: u64) -> DailyStats {
    DailyStats {
      date: date.parse().unwrap(),
      total_dials: dials,
      contacts,
      conversations: convos,
      demos_booked: demos,
      demos_held: 0,
      deals_closed: 0,
      hours_dialed: 0.0,
    }
  }

  #[test]
  fn delta_for_outcome_classifies() {
    let d = StatsDelta::for_outcome(Outcome::Conversation);
    assert_eq!((d.total_dials, d.contacts, d.conversations, d.demos_booked), (1, 1, 1, 0));

    let d = StatsDelta::for_outcome(Outcome::Callback);
    assert_eq!((d.total_dials, d.contacts, d.conversations, d.demos_booked), (1, 1, 0, 0));

    let d = StatsDelta::for_outcome(Outcome::Voicemail);
    assert_eq!((d.total_dials, d.contacts, d.conversations, d.demos_booked), (1, 0, 0, 0));
  }

  #[test]
  fn rolling_sums_only_days_with_data() {
    // Three days of data inside a seven-day ask: rates come from those
    // three days' totals alone.
    let rows = vec![
      day("2024-01-01", 40, 10, 4, 1),
      day("2024-01-03", 30, 5, 2, 1),
      day("2024-01-06", 30, 5, 4, 0),
    ];
    let r = RollingStats::from_rows(&rows);
    assert_eq!(r.days_with_data, 3);
    assert_eq!(r.total_dials, 100);
    assert_eq!(r.contacts, 20);
    assert!((r.contact_rate - 0.2).abs() < 1e-9);
    assert!((r.conversation_rate - 0.5).abs() < 1e-9);
    assert!((r.demo_rate - 0.2).abs() < 1e-9);
  }

  #[test]
  fn rates_survive_zero_denominators() {
    let r = RollingStats::from_rows(&[]);
    assert_eq!(r.days_with_data, 0);
    assert_eq!(r.contact_rate, 0.0);
    assert_eq!(r.conversation_rate, 0.0);
    assert_eq!(r.demo_rate, 0.0);
    assert_eq!(r.close_rate, 0.0);

    // Dials but no contacts: only contact_rate has a denominator.
    let r = RollingStats::from_rows(&[day("2024-01-01", 10, 0, 0, 0)]);
    assert_eq!(r.contact_rate, 0.0);
    assert_eq!(r.demo_rate, 0.0);
  }

  #[test]
  fn hourly_breakdown_buckets_by_reference_hour() {
    let entry = |hour_utc: u32, outcome: Outcome| CallHistoryEntry {
      entry_id:       Uuid::new_v4(),
      lead_id:        Uuid::new_v4(),
      attempt_number: 1,
      outcome,
      notes:          None,
      demo_date:      None,
      callback_at:    None,
      recorded_at:    Utc.with_ymd_and_hms(2024, 1, 15, hour_utc, 5, 0).unwrap(),
    };

    // 14:00 and 15:00 UTC are 09:00 and 10:00 in the reference zone.
    let buckets = hourly_breakdown(&[
      entry(14, Outcome::NoAnswer),
      entry(14, Outcome::Conversation),
      entry(15, Outcome::Voicemail),
    ]);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].hour, 9);
    assert_eq!(buckets[0].dials, 2);
    assert_eq!(buckets[0].contacts, 1);
    assert!((buckets[0].contact_rate - 0.5).abs() < 1e-9);
    assert_eq!(buckets[1].hour, 10);
    assert_eq!(buckets[1].contacts, 0);
  }

  #[test]
  fn empty_history_yields_no_buckets() {
    assert!(hourly_breakdown(&[]).is_empty());
  }
}
