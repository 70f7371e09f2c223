//! Handlers for `/leads` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/leads` | Optional `status`, `region`, `text`, `limit`, `offset` |
//! | `POST`  | `/leads` | Body: [`NewLeadBody`]; returns 201 + stored lead |
//! | `GET`   | `/leads/:id` | 404 if not found |
//! | `PATCH` | `/leads/:id` | Contact fields + the dial surface's status toggle |
//! | `GET`   | `/leads/:id/history` | Append-only disposition trail |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cadence_core::{
  Error as CoreError,
  history::CallHistoryEntry,
  lead::{Lead, LeadPatch, LeadQuery, LeadStatus, NewLead},
  region::Region,
  store::DialerStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub status: Option<LeadStatus>,
  pub region: Option<Region>,
  pub text:   Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /leads[?status=...][&region=...][&text=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Lead>>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = LeadQuery {
    status: params.status,
    region: params.region,
    text:   params.text,
    limit:  params.limit,
    offset: params.offset,
  };

  let leads = store
    .list_leads(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(leads))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /leads`.
#[derive(Debug, Deserialize)]
pub struct NewLeadBody {
  pub business_name: String,
  pub phone:         String,
  pub contact_name:  Option<String>,
  pub website:       Option<String>,
  pub state:         Option<String>,
  pub region:        Option<Region>,
  pub max_attempts:  Option<u32>,
}

impl From<NewLeadBody> for NewLead {
  fn from(b: NewLeadBody) -> Self {
    NewLead {
      business_name: b.business_name,
      phone:         b.phone,
      contact_name:  b.contact_name,
      website:       b.website,
      state:         b.state,
      region:        b.region,
      max_attempts:  b.max_attempts,
    }
  }
}

/// `POST /leads`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewLeadBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let lead = store
    .add_lead(body.into())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(lead)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Lead>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let lead = store
    .get_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::LeadNotFound(id))?;
  Ok(Json(lead))
}

// ─── Patch ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /leads/:id`. Absent fields stay untouched.
#[derive(Debug, Deserialize, Default)]
pub struct PatchBody {
  pub business_name: Option<String>,
  pub contact_name:  Option<String>,
  pub phone:         Option<String>,
  pub website:       Option<String>,
  pub state:         Option<String>,
  pub region:        Option<Region>,
  pub status:        Option<LeadStatus>,
  pub max_attempts:  Option<u32>,
}

impl From<PatchBody> for LeadPatch {
  fn from(b: PatchBody) -> Self {
    LeadPatch {
      business_name: b.business_name,
      contact_name:  b.contact_name,
      phone:         b.phone,
      website:       b.website,
      state:         b.state,
      region:        b.region,
      status:        b.status,
      max_attempts:  b.max_attempts,
    }
  }
}

/// `PATCH /leads/:id`
pub async fn patch<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Lead>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let lead = store
    .patch_lead(id, body.into())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(CoreError::LeadNotFound(id))?;
  Ok(Json(lead))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id/history`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<CallHistoryEntry>>, ApiError>
where
  S: DialerStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // The empty trail of an unknown lead and of a never-dialed lead look the
  // same here; existence checks belong to /leads/:id.
  let entries = store
    .history_for_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entries))
}
