//! Handlers for `/stats` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/stats/daily` | One date's counters; zeros when no row exists |
//! | `GET`  | `/stats/rolling` | N-day rollup over days that have data |
//! | `GET`  | `/stats/hourly` | Per-hour dials/contacts from the history trail |
//! | `POST` | `/stats/adjust` | Administrative increments (demos held, deals, hours) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use cadence_core::{
  stats::{self, DailyStats, HourlyBucket, RollingStats, StatsDelta},
  store::DialerStore,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::ApiError;

/// Rolling window applied when the caller doesn't ask for one.
const DEFAULT_ROLLING_DAYS: u32 = 7;

// ─── Daily ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct DateParams {
  /// Defaults to today (UTC).
  pub date: Option<NaiveDate>,
}

/// `GET /stats/daily[?date=YYYY-MM-DD]`
pub async fn daily<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DateParams>,
) -> Result<Json<DailyStats>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
  let row = store
    .stats_for(date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .unwrap_or_else(|| DailyStats::empty(date));
  Ok(Json(row))
}

// ─── Rolling ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct RollingParams {
  pub days: Option<u32>,
}

/// `GET /stats/rolling[?days=N]`
pub async fn rolling<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<RollingParams>,
) -> Result<Json<RollingStats>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let days = params.days.unwrap_or(DEFAULT_ROLLING_DAYS);
  let rows = store
    .recent_stats(days)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(RollingStats::from_rows(&rows)))
}

// ─── Hourly ───────────────────────────────────────────────────────────────────

/// `GET /stats/hourly[?date=YYYY-MM-DD]`
pub async fn hourly<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DateParams>,
) -> Result<Json<Vec<HourlyBucket>>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
  let entries = store
    .history_on(date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stats::hourly_breakdown(&entries)))
}

// ─── Adjust ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /stats/adjust`. Counters the disposition
/// path cannot produce (demos held, deals closed, hours dialed) are bumped
/// here; all fields default to zero.
#[derive(Debug, Deserialize)]
pub struct AdjustBody {
  /// Defaults to today (UTC).
  pub date:  Option<NaiveDate>,
  #[serde(flatten)]
  pub delta: StatsDelta,
}

/// `POST /stats/adjust`
pub async fn adjust<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<AdjustBody>,
) -> Result<Json<DailyStats>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let date = body.date.unwrap_or_else(|| Utc::now().date_naive());
  let row = store
    .increment_stats(date, body.delta)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(row))
}
