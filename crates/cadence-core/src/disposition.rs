//! The disposition engine — pure decision logic for recording a call
//! outcome against a lead.
//!
//! [`plan`] computes the complete next state up front; the store applies a
//! plan transactionally with its counter math done in SQL, so the engine
//! never holds mutable state and is trivially unit-testable.

use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};

use crate::{
  history::CallHistoryEntry,
  lead::{Lead, LeadStatus},
  outcome::Outcome,
  stats::StatsDelta,
};

/// Days before a lead that didn't pick up becomes eligible again, before
/// jitter is added.
pub const RETRY_BASE_DAYS: i64 = 2;

/// Days before re-attempting after a conversation that didn't close.
pub const CONVERSATION_RETRY_DAYS: i64 = 3;

/// Follow-up horizon when a callback was promised without a time.
pub const CALLBACK_DEFAULT_HOURS: i64 = 24;

/// Per-entry clamp on the note text appended to a lead's log.
pub const NOTE_MAX_LEN: usize = 500;

// ─── Jitter ──────────────────────────────────────────────────────────────────

/// Source of the retry-schedule jitter fraction.
///
/// Injectable so tests can pin the no-answer delay anywhere inside its
/// `[RETRY_BASE_DAYS, RETRY_BASE_DAYS + 1)` day bound.
pub trait JitterSource {
  /// A fraction in `[0, 1)`.
  fn fraction(&mut self) -> f64;
}

/// Operating-system entropy — the production source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsJitter;

impl JitterSource for OsJitter {
  fn fraction(&mut self) -> f64 {
    // 53 high bits of a u64 give a uniform fraction at full f64 precision.
    (OsRng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
  }
}

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// Caller-supplied context accompanying an outcome.
#[derive(Debug, Clone, Default)]
pub struct DispositionContext {
  pub notes:       Option<String>,
  /// Only meaningful for [`Outcome::DemoBooked`].
  pub demo_date:   Option<DateTime<Utc>>,
  /// Only meaningful for [`Outcome::Callback`].
  pub callback_at: Option<DateTime<Utc>>,
}

/// Everything the store must apply for one disposition event.
#[derive(Debug, Clone, PartialEq)]
pub struct DispositionPlan {
  pub outcome:            Outcome,
  pub new_status:         LeadStatus,
  /// `None` leaves the lead's existing schedule untouched (terminal
  /// outcomes never reschedule).
  pub next_call_at:       Option<DateTime<Utc>>,
  /// The lead's `attempt_count` after the event.
  pub attempt_number:     u32,
  pub set_demo_booked:    bool,
  pub demo_date:          Option<DateTime<Utc>>,
  pub set_not_interested: bool,
  pub set_wrong_number:   bool,
  /// Line appended to the lead's notes log.
  pub note_line:          String,
  /// Clamped caller notes carried onto the history entry.
  pub notes:              Option<String>,
  /// The promised follow-up time, for the history entry.
  pub callback_at:        Option<DateTime<Utc>>,
  /// Daily-stats increments this event contributes.
  pub stats:              StatsDelta,
}

/// Receipt returned by [`crate::store::DialerStore::record_disposition`].
#[derive(Debug, Clone)]
pub struct DispositionReceipt {
  /// The lead as persisted after the event.
  pub lead:    Lead,
  pub history: CallHistoryEntry,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Compute the complete next state for `lead` after `outcome`.
///
/// `jitter` must be in `[0, 1)`. It spreads no-answer retries across a
/// one-day window so a batch dialed together doesn't come due together.
pub fn plan(
  lead:    &Lead,
  outcome: Outcome,
  ctx:     &DispositionContext,
  now:     DateTime<Utc>,
  jitter:  f64,
) -> DispositionPlan {
  let attempt_number = lead.attempt_count + 1;
  let exhausted      = attempt_number >= lead.max_attempts;
  let requeue        = if exhausted { LeadStatus::Archived } else { LeadStatus::Queued };

  let (new_status, next_call_at) = match outcome {
    Outcome::NoAnswer | Outcome::Voicemail | Outcome::Gatekeeper => {
      let delay_secs = ((RETRY_BASE_DAYS as f64 + jitter) * 86_400.0) as i64;
      (requeue, Some(now + Duration::seconds(delay_secs)))
    }
    Outcome::Conversation => {
      (requeue, Some(now + Duration::days(CONVERSATION_RETRY_DAYS)))
    }
    Outcome::DemoBooked | Outcome::NotInterested | Outcome::WrongNumber => {
      (LeadStatus::Completed, None)
    }
    Outcome::Callback => {
      let at = ctx
        .callback_at
        .unwrap_or(now + Duration::hours(CALLBACK_DEFAULT_HOURS));
      (LeadStatus::Callback, Some(at))
    }
  };

  let notes = ctx
    .notes
    .as_deref()
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(clamp_note);

  let note_line = match &notes {
    Some(n) => format!("[{}] {outcome}: {n}", now.format("%Y-%m-%d")),
    None => format!("[{}] {outcome}", now.format("%Y-%m-%d")),
  };

  let demo_date = if outcome == Outcome::DemoBooked { ctx.demo_date } else { None };
  let callback_at = if outcome == Outcome::Callback { next_call_at } else { None };

  DispositionPlan {
    outcome,
    new_status,
    next_call_at,
    attempt_number,
    set_demo_booked: outcome == Outcome::DemoBooked,
    demo_date,
    set_not_interested: outcome == Outcome::NotInterested,
    set_wrong_number: outcome == Outcome::WrongNumber,
    note_line,
    notes,
    callback_at,
    stats: StatsDelta::for_outcome(outcome),
  }
}

fn clamp_note(n: &str) -> String { n.chars().take(NOTE_MAX_LEN).collect() }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::lead::DEFAULT_MAX_ATTEMPTS;

  fn lead(attempt_count: u32, max_attempts: u32) -> Lead {
    Lead {
      lead_id:        uuid::Uuid::new_v4(),
      business_name:  "Canal St Bakery".into(),
      contact_name:   None,
      phone:          "+12125550142".into(),
      website:        None,
      state:          Some("NY".into()),
      region:         None,
      status:         LeadStatus::Queued,
      attempt_count,
      max_attempts,
      next_call_at:   None,
      last_called_at: None,
      last_outcome:   None,
      demo_booked:    false,
      demo_date:      None,
      not_interested: false,
      wrong_number:   false,
      notes:          String::new(),
      created_at:     Utc::now(),
    }
  }

  fn at() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 1, 15, 16, 0, 0).unwrap() }

  #[test]
  fn no_answer_requeues_with_jittered_delay() {
    let p = plan(&lead(0, 5), Outcome::NoAnswer, &Default::default(), at(), 0.0);
    assert_eq!(p.new_status, LeadStatus::Queued);
    assert_eq!(p.next_call_at, Some(at() + Duration::days(2)));
    assert_eq!(p.attempt_number, 1);

    // Jitter stays strictly inside [2, 3) days.
    let p = plan(&lead(0, 5), Outcome::NoAnswer, &Default::default(), at(), 0.999);
    let delay = p.next_call_at.unwrap() - at();
    assert!(delay >= Duration::days(2));
    assert!(delay < Duration::days(3));
  }

  #[test]
  fn retry_outcomes_archive_at_the_cap() {
    for outcome in [
      Outcome::NoAnswer,
      Outcome::Voicemail,
      Outcome::Gatekeeper,
      Outcome::Conversation,
    ] {
      let p = plan(&lead(4, 5), outcome, &Default::default(), at(), 0.5);
      assert_eq!(p.new_status, LeadStatus::Archived, "outcome {outcome}");

      let p = plan(&lead(0, 5), outcome, &Default::default(), at(), 0.5);
      assert_eq!(p.new_status, LeadStatus::Queued, "outcome {outcome}");
    }
  }

  #[test]
  fn conversation_reschedules_three_days_out() {
    let p = plan(&lead(1, 5), Outcome::Conversation, &Default::default(), at(), 0.5);
    assert_eq!(p.next_call_at, Some(at() + Duration::days(3)));
  }

  #[test]
  fn terminal_outcomes_complete_and_never_reschedule() {
    for outcome in
      [Outcome::DemoBooked, Outcome::NotInterested, Outcome::WrongNumber]
    {
      // Even a lead at its cap completes rather than archives.
      let p = plan(&lead(4, 5), outcome, &Default::default(), at(), 0.5);
      assert_eq!(p.new_status, LeadStatus::Completed, "outcome {outcome}");
      assert_eq!(p.next_call_at, None, "outcome {outcome}");
    }
  }

  #[test]
  fn demo_booked_carries_the_demo_date() {
    let demo = at() + Duration::days(4);
    let ctx = DispositionContext { demo_date: Some(demo), ..Default::default() };
    let p = plan(&lead(0, 5), Outcome::DemoBooked, &ctx, at(), 0.5);
    assert!(p.set_demo_booked);
    assert_eq!(p.demo_date, Some(demo));

    // Caller may book a demo without fixing the date yet.
    let p = plan(&lead(0, 5), Outcome::DemoBooked, &Default::default(), at(), 0.5);
    assert!(p.set_demo_booked);
    assert_eq!(p.demo_date, None);
  }

  #[test]
  fn demo_date_is_ignored_for_other_outcomes() {
    let ctx = DispositionContext {
      demo_date: Some(at() + Duration::days(4)),
      ..Default::default()
    };
    let p = plan(&lead(0, 5), Outcome::Conversation, &ctx, at(), 0.5);
    assert!(!p.set_demo_booked);
    assert_eq!(p.demo_date, None);
  }

  #[test]
  fn callback_uses_the_promised_time() {
    let promised = at() + Duration::hours(50);
    let ctx = DispositionContext { callback_at: Some(promised), ..Default::default() };
    let p = plan(&lead(0, 5), Outcome::Callback, &ctx, at(), 0.5);
    assert_eq!(p.new_status, LeadStatus::Callback);
    assert_eq!(p.next_call_at, Some(promised));
    assert_eq!(p.callback_at, Some(promised));
  }

  #[test]
  fn callback_defaults_to_a_day_out() {
    let p = plan(&lead(0, 5), Outcome::Callback, &Default::default(), at(), 0.5);
    assert_eq!(p.next_call_at, Some(at() + Duration::hours(24)));
  }

  #[test]
  fn callback_past_the_cap_still_schedules() {
    // A promised follow-up is honoured even on the final attempt.
    let p = plan(&lead(4, 5), Outcome::Callback, &Default::default(), at(), 0.5);
    assert_eq!(p.new_status, LeadStatus::Callback);
  }

  #[test]
  fn note_line_formats_with_and_without_notes() {
    let ctx = DispositionContext {
      notes: Some("  asked for pricing sheet ".into()),
      ..Default::default()
    };
    let p = plan(&lead(0, 5), Outcome::Conversation, &ctx, at(), 0.5);
    assert_eq!(p.note_line, "[2024-01-15] conversation: asked for pricing sheet");

    let p = plan(&lead(0, 5), Outcome::NoAnswer, &Default::default(), at(), 0.5);
    assert_eq!(p.note_line, "[2024-01-15] no_answer");
  }

  #[test]
  fn long_notes_are_clamped() {
    let ctx = DispositionContext { notes: Some("x".repeat(2000)), ..Default::default() };
    let p = plan(&lead(0, 5), Outcome::Conversation, &ctx, at(), 0.5);
    assert_eq!(p.notes.as_ref().unwrap().len(), NOTE_MAX_LEN);
  }

  #[test]
  fn stats_delta_matches_classification() {
    let p = plan(&lead(0, 5), Outcome::DemoBooked, &Default::default(), at(), 0.5);
    assert_eq!(p.stats.total_dials, 1);
    assert_eq!(p.stats.contacts, 1);
    assert_eq!(p.stats.conversations, 1);
    assert_eq!(p.stats.demos_booked, 1);

    let p = plan(&lead(0, 5), Outcome::NoAnswer, &Default::default(), at(), 0.5);
    assert_eq!(p.stats.total_dials, 1);
    assert_eq!(p.stats.contacts, 0);
    assert_eq!(p.stats.conversations, 0);
    assert_eq!(p.stats.demos_booked, 0);
  }

  #[test]
  fn default_cap_applies() {
    let p = plan(
      &lead(DEFAULT_MAX_ATTEMPTS - 1, DEFAULT_MAX_ATTEMPTS),
      Outcome::Voicemail,
      &Default::default(),
      at(),
      0.5,
    );
    assert_eq!(p.new_status, LeadStatus::Archived);
  }

  #[test]
  fn os_jitter_stays_in_bounds() {
    let mut j = OsJitter;
    for _ in 0..1000 {
      let f = j.fraction();
      assert!((0.0..1.0).contains(&f));
    }
  }
}
