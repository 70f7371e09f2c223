//! Handlers for `/numbers` endpoints — pool administration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/numbers` | Optional `?status=active\|cooling\|retired` |
//! | `POST` | `/numbers` | 409 when the phone number already exists |
//! | `GET`  | `/numbers/:id` | 404 if not found |
//! | `POST` | `/numbers/:id/retire` | Idempotent soft retire |
//! | `POST` | `/numbers/:id/reactivate` | Also zeroes the hourly counter |
//! | `POST` | `/numbers/reset-hourly` | Bulk reset, meant for an hourly trigger |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadence_core::{
  Error as CoreError,
  pool::{NewPoolEntry, PoolEntry, PoolStatus},
  store::DialerStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List / get ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status: Option<PoolStatus>,
}

/// `GET /numbers[?status=<status>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PoolEntry>>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let numbers = store
    .list_numbers(params.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(numbers))
}

/// `GET /numbers/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PoolEntry>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .get_number(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::NumberNotFound(id))?;
  Ok(Json(entry))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /numbers`.
#[derive(Debug, Deserialize)]
pub struct NewNumberBody {
  pub phone_number:       String,
  pub label:              Option<String>,
  pub area_code:          Option<String>,
  pub state:              Option<String>,
  pub provider_sid:       Option<String>,
  pub max_calls_per_hour: Option<u32>,
  pub cooldown_minutes:   Option<u32>,
}

impl From<NewNumberBody> for NewPoolEntry {
  fn from(b: NewNumberBody) -> Self {
    NewPoolEntry {
      phone_number:       b.phone_number,
      label:              b.label,
      area_code:          b.area_code,
      state:              b.state,
      provider_sid:       b.provider_sid,
      max_calls_per_hour: b.max_calls_per_hour,
      cooldown_minutes:   b.cooldown_minutes,
    }
  }
}

/// `POST /numbers`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewNumberBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let phone = body.phone_number.clone();
  let entry = store
    .add_number(body.into())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::DuplicateNumber(phone))?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /numbers/:id/retire`
pub async fn retire<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PoolEntry>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .retire_number(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::NumberNotFound(id))?;
  Ok(Json(entry))
}

/// `POST /numbers/:id/reactivate`
pub async fn reactivate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PoolEntry>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .reactivate_number(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::NumberNotFound(id))?;
  Ok(Json(entry))
}

// ─── Bulk reset ───────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /numbers/reset-hourly`. Optional.
#[derive(Debug, Deserialize, Default)]
pub struct ResetBody {
  /// Also zero `calls_today` — set by the once-a-day trigger.
  #[serde(default)]
  pub reset_daily: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
  pub reset: u64,
}

/// `POST /numbers/reset-hourly`
///
/// Intended to be invoked once per hour by an external scheduler (or the
/// server's built-in reset task); also usable manually.
pub async fn reset_hourly<S>(
  State(store): State<Arc<S>>,
  body: Option<Json<ResetBody>>,
) -> Result<Json<ResetResponse>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let reset_daily = body.map(|Json(b)| b.reset_daily).unwrap_or(false);
  let reset = store
    .reset_hourly_counters(reset_daily)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ResetResponse { reset }))
}
