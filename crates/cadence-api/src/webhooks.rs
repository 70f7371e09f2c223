//! Webhook receivers for the telephony provider.
//!
//! Thin by design: events are normalized into the internal vocabulary and
//! recorded; they never drive lead transitions. Unknown vocabulary is
//! logged and acknowledged — bouncing a 4xx at the provider only earns a
//! redelivery of the same unknown event.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use cadence_core::{
  store::DialerStore,
  webhook::{self, CallEvent},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Voice lifecycle ──────────────────────────────────────────────────────────

/// JSON body accepted by `POST /webhooks/voice`.
#[derive(Debug, Deserialize)]
pub struct VoiceEventBody {
  pub call_sid:      String,
  /// Provider vocabulary, e.g. `ringing`, `in-progress`, `no-answer`.
  pub call_status:   String,
  pub from:          Option<String>,
  pub to:            Option<String>,
  pub duration_secs: Option<u32>,
  /// Defaults to arrival time when the provider omits it.
  pub timestamp:     Option<DateTime<Utc>>,
}

/// `POST /webhooks/voice`
pub async fn voice<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<VoiceEventBody>,
) -> Result<StatusCode, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(status) = webhook::normalize_status(&body.call_status) else {
    tracing::warn!(
      call_sid = %body.call_sid,
      call_status = %body.call_status,
      "unknown provider call status; event dropped"
    );
    return Ok(StatusCode::NO_CONTENT);
  };

  let event = CallEvent {
    call_sid:      body.call_sid,
    status,
    from_number:   body.from,
    to_number:     body.to,
    duration_secs: body.duration_secs,
    occurred_at:   body.timestamp.unwrap_or_else(Utc::now),
  };

  store
    .upsert_call_log(event)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Spam complaints ──────────────────────────────────────────────────────────

/// JSON body accepted by `POST /webhooks/spam-report`.
#[derive(Debug, Deserialize)]
pub struct SpamReportBody {
  pub phone_number: String,
}

/// `POST /webhooks/spam-report`
///
/// Counts a carrier spam complaint against a pool number; past the limit
/// the number is force-retired by the store.
pub async fn spam_report<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SpamReportBody>,
) -> Result<StatusCode, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated = store
    .record_spam_report(&body.phone_number)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if updated.is_none() {
    // Complaints about numbers we don't manage aren't the provider's
    // problem to retry.
    tracing::warn!(phone_number = %body.phone_number, "spam report for unmanaged number");
  }

  Ok(StatusCode::NO_CONTENT)
}
