//! Handler for `GET /queue` — the dial floor's "what now" snapshot.
//!
//! Read-only. Sub-reads degrade to empty results rather than failing the
//! snapshot, so the floor can always render (a "no leads" state beats a
//! crash mid-session).

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use cadence_core::{
  Error as CoreError,
  pool::{self, PoolStatus},
  queue::{self, CALLBACK_BATCH_LIMIT, DEFAULT_QUEUE_LIMIT, QueueSnapshot},
  region::Region,
  store::DialerStore,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct QueueParams {
  pub limit:  Option<usize>,
  /// Explicit region override; takes precedence over the hour schedule.
  pub region: Option<String>,
}

/// `GET /queue[?limit=...][&region=...]`
pub async fn snapshot<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<QueueParams>,
) -> Result<Json<QueueSnapshot>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let now = Utc::now();

  let override_region = params
    .region
    .as_deref()
    .map(|s| s.parse::<Region>().map_err(|_| CoreError::UnknownRegion(s.to_owned())))
    .transpose()?;
  let current_region = override_region.or_else(|| Region::on_the_clock(now));
  let limit = params.limit.unwrap_or(DEFAULT_QUEUE_LIMIT);

  let callbacks = store
    .due_callbacks(now, CALLBACK_BATCH_LIMIT)
    .await
    .unwrap_or_else(|e| {
      tracing::warn!(error = %e, "callback harvest failed; serving without");
      Vec::new()
    });

  let queued = store
    .queued_leads(now, current_region, limit)
    .await
    .unwrap_or_else(|e| {
      tracing::warn!(error = %e, "queue read failed; serving without");
      Vec::new()
    });

  let leads = queue::merge(callbacks.clone(), queued);

  let completed_today = store.dials_on(now.date_naive()).await.unwrap_or_else(|e| {
    tracing::warn!(error = %e, "dials-today count failed");
    0
  });

  let remaining_today = store.callable_remaining().await.unwrap_or_else(|e| {
    tracing::warn!(error = %e, "remaining count failed");
    0
  });

  // Breakdown counts span all regions, independent of the target filter.
  let breakdown = store.callable_by_region().await.unwrap_or_else(|e| {
    tracing::warn!(error = %e, "region breakdown failed");
    Default::default()
  });

  let numbers = store
    .list_numbers(Some(PoolStatus::Active))
    .await
    .unwrap_or_else(|e| {
      tracing::warn!(error = %e, "pool listing failed; no number suggested");
      Vec::new()
    });
  let first_state = leads.first().and_then(|l| l.state.as_deref());
  let selected_number = pool::select_number(&numbers, first_state).cloned();

  Ok(Json(QueueSnapshot {
    leads,
    callbacks_due: callbacks,
    current_region,
    completed_today,
    remaining_today,
    breakdown,
    selected_number,
  }))
}
