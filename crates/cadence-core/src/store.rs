//! The `DialerStore` trait.
//!
//! Implemented by storage backends (e.g. `cadence-store-sqlite`). Higher
//! layers (`cadence-api`, `cadence-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Absence is modelled as `Option` in return types (unknown lead, unknown
//! number, duplicate number on add) so callers can map domain misses to
//! their own error vocabulary without downcasting the backend error.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  disposition::{DispositionContext, DispositionReceipt},
  history::CallHistoryEntry,
  lead::{Lead, LeadPatch, LeadQuery, NewLead},
  outcome::Outcome,
  pool::{NewPoolEntry, PoolEntry, PoolStatus},
  queue::RegionBreakdown,
  region::Region,
  stats::{DailyStats, StatsDelta},
  webhook::{CallEvent, CallLog},
};

/// Abstraction over a Cadence storage backend.
pub trait DialerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Leads ─────────────────────────────────────────────────────────────

  /// Create and persist a new lead. The store assigns `lead_id` and
  /// `created_at`, and derives `region` from `state` when not supplied.
  fn add_lead(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Retrieve a lead by id. Returns `None` if not found.
  fn get_lead(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// List leads matching `query`.
  fn list_leads<'a>(
    &'a self,
    query: &'a LeadQuery,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + 'a;

  /// Administrative edit of contact fields (and the dial surface's
  /// `in_progress` toggle). Returns `None` if the lead does not exist.
  fn patch_lead(
    &self,
    id: Uuid,
    patch: LeadPatch,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  // ── Disposition ───────────────────────────────────────────────────────

  /// Apply one disposition event: lead state transition, attempt
  /// accounting, note append, history entry, and daily-stats increments —
  /// atomically. Returns `None` if the lead does not exist (nothing is
  /// written).
  ///
  /// `jitter` is the engine's retry-spread fraction in `[0, 1)`; callers
  /// draw it from a [`crate::disposition::JitterSource`].
  fn record_disposition(
    &self,
    lead_id: Uuid,
    outcome: Outcome,
    ctx: DispositionContext,
    now: DateTime<Utc>,
    jitter: f64,
  ) -> impl Future<Output = Result<Option<DispositionReceipt>, Self::Error>> + Send + '_;

  // ── Queue reads ───────────────────────────────────────────────────────

  /// Callback leads whose promised time has passed, most overdue first,
  /// still under their attempt cap.
  fn due_callbacks(
    &self,
    now: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + '_;

  /// The regular queue: `queued` leads under their attempt cap and
  /// eligible now, least-attempted and oldest first, optionally filtered
  /// to one region.
  fn queued_leads(
    &self,
    now: DateTime<Utc>,
    region: Option<Region>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Lead>, Self::Error>> + Send + '_;

  /// Remaining-callable counts per region, across all regions regardless
  /// of any queue filter.
  fn callable_by_region(
    &self,
  ) -> impl Future<Output = Result<RegionBreakdown, Self::Error>> + Send + '_;

  /// Leads still callable (queued/in_progress/callback, under cap).
  fn callable_remaining(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of history entries recorded on `date`.
  fn dials_on(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── History ───────────────────────────────────────────────────────────

  /// All history entries for a lead, in attempt order.
  fn history_for_lead(
    &self,
    lead_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CallHistoryEntry>, Self::Error>> + Send + '_;

  /// All history entries recorded on `date`, in recording order.
  fn history_on(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<CallHistoryEntry>, Self::Error>> + Send + '_;

  // ── Phone number pool ─────────────────────────────────────────────────

  /// Add a number to the pool. Returns `None` when the phone number is
  /// already present (callers surface a conflict).
  fn add_number(
    &self,
    input: NewPoolEntry,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + '_;

  /// Retrieve a pool entry by id. Returns `None` if not found.
  fn get_number(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + '_;

  /// List pool entries, optionally filtered by status.
  fn list_numbers(
    &self,
    status: Option<PoolStatus>,
  ) -> impl Future<Output = Result<Vec<PoolEntry>, Self::Error>> + Send + '_;

  /// Record that a call went out on this number: bump the usage counters,
  /// stamp `last_used_at`, flip to `cooling` at the hourly cap, and
  /// force-retire past the spam limit — atomically, in the store. Returns
  /// the updated entry, or `None` if the id does not resolve.
  fn record_pool_call(
    &self,
    id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + '_;

  /// Ingest a spam complaint against a number; retires it past the limit.
  /// Returns `None` if the phone number is not in the pool.
  fn record_spam_report<'a>(
    &'a self,
    phone_number: &'a str,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + 'a;

  /// Soft-retire a number. Idempotent.
  fn retire_number(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + '_;

  /// Reactivate a number and zero its hourly counter — an explicit
  /// administrative override of the cooldown.
  fn reactivate_number(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PoolEntry>, Self::Error>> + Send + '_;

  /// Bulk reset intended for an hourly external trigger: zero
  /// `calls_this_hour` on every non-retired entry and un-cool `cooling`
  /// entries back to `active`. With `reset_daily`, also zero
  /// `calls_today`. Returns the number of entries touched.
  fn reset_hourly_counters(
    &self,
    reset_daily: bool,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Daily stats ───────────────────────────────────────────────────────

  /// Apply `delta` to the row for `date` as a single atomic upsert and
  /// return the row after the increment. Creating the row and
  /// incrementing it must not race.
  fn increment_stats(
    &self,
    date: NaiveDate,
    delta: StatsDelta,
  ) -> impl Future<Output = Result<DailyStats, Self::Error>> + Send + '_;

  /// The stats row for `date`, if any.
  fn stats_for(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<DailyStats>, Self::Error>> + Send + '_;

  /// The most recent `days` rows that exist, newest first. Dates without
  /// a row are simply absent.
  fn recent_stats(
    &self,
    days: u32,
  ) -> impl Future<Output = Result<Vec<DailyStats>, Self::Error>> + Send + '_;

  // ── Call log ──────────────────────────────────────────────────────────

  /// Upsert the call-log row for an event's SID: first event fixes
  /// `started_at`, later events advance status/duration.
  fn upsert_call_log(
    &self,
    event: CallEvent,
  ) -> impl Future<Output = Result<CallLog, Self::Error>> + Send + '_;
}
