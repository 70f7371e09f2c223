//! Handler for `POST /dispositions` — recording one call outcome.
//!
//! The lead transition, history entry and stats increments commit
//! atomically in the store; the pool-number rotation update that follows is
//! best-effort and never fails the disposition.

use std::sync::Arc;

use axum::{Json, extract::State};
use cadence_core::{
  Error as CoreError,
  disposition::{DispositionContext, JitterSource as _, OsJitter},
  lead::{Lead, LeadStatus},
  outcome::Outcome,
  store::DialerStore,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body accepted by `POST /dispositions`.
#[derive(Debug, Deserialize)]
pub struct RecordBody {
  pub lead_id:          Uuid,
  /// One of the closed outcome vocabulary; anything else is a 400.
  pub outcome:          String,
  pub notes:            Option<String>,
  pub demo_date:        Option<DateTime<Utc>>,
  pub callback_at:      Option<DateTime<Utc>>,
  /// The pool number the call went out on, when a managed one was used.
  pub caller_number_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
  pub new_status:    LeadStatus,
  pub attempt_count: u32,
  pub lead:          Lead,
}

/// `POST /dispositions`
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RecordBody>,
) -> Result<Json<RecordResponse>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome: Outcome = body
    .outcome
    .parse()
    .map_err(|_| CoreError::UnknownOutcome(body.outcome.clone()))?;

  let ctx = DispositionContext {
    notes:       body.notes,
    demo_date:   body.demo_date,
    callback_at: body.callback_at,
  };

  let now = Utc::now();
  let receipt = store
    .record_disposition(body.lead_id, outcome, ctx, now, OsJitter.fraction())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::LeadNotFound(body.lead_id))?;

  // Rotation bookkeeping must never block the recorded disposition.
  if let Some(number_id) = body.caller_number_id {
    match store.record_pool_call(number_id, now).await {
      Ok(Some(_)) => {}
      Ok(None) => {
        tracing::warn!(%number_id, "pool number not found; rotation update skipped");
      }
      Err(e) => {
        tracing::warn!(%number_id, error = %e, "pool counter update failed");
      }
    }
  }

  Ok(Json(RecordResponse {
    new_status:    receipt.lead.status,
    attempt_count: receipt.lead.attempt_count,
    lead:          receipt.lead,
  }))
}
