//! JSON REST API for Cadence.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cadence_core::store::DialerStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility — handlers assume the caller is already
//! authorized.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cadence_api::api_router(store.clone()))
//! ```

pub mod dispositions;
pub mod error;
pub mod leads;
pub mod numbers;
pub mod queue;
pub mod stats;
pub mod webhooks;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cadence_core::store::DialerStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DialerStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Dialing
    .route("/dispositions", post(dispositions::record::<S>))
    .route("/queue", get(queue::snapshot::<S>))
    // Leads
    .route("/leads", get(leads::list::<S>).post(leads::create::<S>))
    .route("/leads/{id}", get(leads::get_one::<S>).patch(leads::patch::<S>))
    .route("/leads/{id}/history", get(leads::history::<S>))
    // Caller-ID pool
    .route("/numbers", get(numbers::list::<S>).post(numbers::create::<S>))
    .route("/numbers/{id}", get(numbers::get_one::<S>))
    .route("/numbers/{id}/retire", post(numbers::retire::<S>))
    .route("/numbers/{id}/reactivate", post(numbers::reactivate::<S>))
    .route("/numbers/reset-hourly", post(numbers::reset_hourly::<S>))
    // Stats
    .route("/stats/daily", get(stats::daily::<S>))
    .route("/stats/rolling", get(stats::rolling::<S>))
    .route("/stats/hourly", get(stats::hourly::<S>))
    .route("/stats/adjust", post(stats::adjust::<S>))
    // Provider webhooks
    .route("/webhooks/voice", post(webhooks::voice::<S>))
    .route("/webhooks/spam-report", post(webhooks::spam_report::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use cadence_store_sqlite::SqliteStore;
  use chrono::{Duration, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      // Successful handlers return JSON; some extractor-level rejections
      // (e.g. a malformed body) return plain text. Tolerate the latter so
      // status-only assertions can run.
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn create_lead(app: &Router, name: &str, state: &str) -> String {
    let (status, lead) = send(
      app.clone(),
      "POST",
      "/leads",
      Some(json!({
        "business_name": name,
        "phone": "+12125550100",
        "state": state,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    lead["lead_id"].as_str().unwrap().to_owned()
  }

  // ── Dispositions ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn disposition_flow_updates_lead_and_stats() {
    let app = app().await;
    let lead_id = create_lead(&app, "Flow Test Co", "TX").await;

    let (status, resp) = send(
      app.clone(),
      "POST",
      "/dispositions",
      Some(json!({
        "lead_id": lead_id,
        "outcome": "no_answer",
        "notes": "rang out",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["new_status"], "queued");
    assert_eq!(resp["attempt_count"], 1);

    let (status, lead) = send(app.clone(), "GET", &format!("/leads/{lead_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lead["attempt_count"], 1);
    assert_eq!(lead["last_outcome"], "no_answer");
    assert!(lead["notes"].as_str().unwrap().contains("no_answer: rang out"));
    assert!(lead["next_call_at"].is_string());

    let (status, history) =
      send(app.clone(), "GET", &format!("/leads/{lead_id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, day) = send(app, "GET", "/stats/daily", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day["total_dials"], 1);
    assert_eq!(day["contacts"], 0);
  }

  #[tokio::test]
  async fn disposition_rejects_unknown_outcome() {
    let app = app().await;
    let lead_id = create_lead(&app, "Vocab Co", "TX").await;

    let (status, resp) = send(
      app,
      "POST",
      "/dispositions",
      Some(json!({ "lead_id": lead_id, "outcome": "hung_up" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].as_str().unwrap().contains("hung_up"));
  }

  #[tokio::test]
  async fn disposition_unknown_lead_is_404() {
    let app = app().await;
    let (status, _) = send(
      app,
      "POST",
      "/dispositions",
      Some(json!({
        "lead_id": uuid::Uuid::new_v4().to_string(),
        "outcome": "no_answer",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn disposition_missing_outcome_is_a_client_error() {
    let app = app().await;
    let lead_id = create_lead(&app, "Sparse Co", "TX").await;

    let (status, _) =
      send(app, "POST", "/dispositions", Some(json!({ "lead_id": lead_id }))).await;
    assert!(status.is_client_error(), "got {status}");
  }

  #[tokio::test]
  async fn pool_failure_does_not_block_the_disposition() {
    let app = app().await;
    let lead_id = create_lead(&app, "Resilient Co", "TX").await;

    // A caller_number_id that resolves to nothing: the rotation update is
    // skipped, the disposition still lands.
    let (status, resp) = send(
      app,
      "POST",
      "/dispositions",
      Some(json!({
        "lead_id": lead_id,
        "outcome": "conversation",
        "caller_number_id": uuid::Uuid::new_v4().to_string(),
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["attempt_count"], 1);
  }

  // ── Queue ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn queue_puts_due_callbacks_first_and_suggests_a_local_number() {
    let app = app().await;

    let promised = create_lead(&app, "Promised Co", "TX").await;
    let fresh = create_lead(&app, "Fresh Co", "TX").await;

    let (status, _) = send(
      app.clone(),
      "POST",
      "/numbers",
      Some(json!({ "phone_number": "+15125550001", "state": "TX" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A callback promised for an hour ago is due now.
    let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let (status, _) = send(
      app.clone(),
      "POST",
      "/dispositions",
      Some(json!({
        "lead_id": promised,
        "outcome": "callback",
        "callback_at": past,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, snapshot) =
      send(app, "GET", "/queue?region=central", None).await;
    assert_eq!(status, StatusCode::OK);

    let leads = snapshot["leads"].as_array().unwrap();
    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0]["lead_id"], promised.as_str());
    assert_eq!(leads[1]["lead_id"], fresh.as_str());
    assert_eq!(snapshot["callbacks_due"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["current_region"], "central");
    assert_eq!(snapshot["remaining_today"], 2);
    assert_eq!(
      snapshot["selected_number"]["phone_number"],
      "+15125550001"
    );
  }

  #[tokio::test]
  async fn queue_breakdown_is_independent_of_the_override() {
    let app = app().await;
    create_lead(&app, "NY Co", "NY").await;
    create_lead(&app, "CA Co", "CA").await;

    let (_, eastern_view) = send(app.clone(), "GET", "/queue?region=eastern", None).await;
    let (_, pacific_view) = send(app.clone(), "GET", "/queue?region=pacific", None).await;

    // The primary list follows the override; the breakdown doesn't move.
    assert_eq!(eastern_view["leads"].as_array().unwrap().len(), 1);
    assert_eq!(pacific_view["leads"].as_array().unwrap().len(), 1);
    assert_eq!(eastern_view["breakdown"], pacific_view["breakdown"]);
    assert_eq!(eastern_view["breakdown"]["eastern"], 1);
    assert_eq!(eastern_view["breakdown"]["pacific"], 1);
  }

  #[tokio::test]
  async fn empty_queue_is_a_normal_response() {
    let app = app().await;
    let (status, snapshot) = send(app, "GET", "/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot["leads"].as_array().unwrap().is_empty());
    assert_eq!(snapshot["completed_today"], 0);
    assert_eq!(snapshot["remaining_today"], 0);
    assert!(snapshot["selected_number"].is_null());
  }

  #[tokio::test]
  async fn queue_rejects_unknown_region() {
    let app = app().await;
    let (status, _) = send(app, "GET", "/queue?region=atlantic", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Pool administration ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn duplicate_number_is_a_conflict() {
    let app = app().await;

    let body = json!({ "phone_number": "+15125550001" });
    let (status, _) = send(app.clone(), "POST", "/numbers", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, resp) = send(app, "POST", "/numbers", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(resp["error"].as_str().unwrap().contains("+15125550001"));
  }

  #[tokio::test]
  async fn retire_reactivate_and_reset_round_trip() {
    let app = app().await;

    let (_, entry) = send(
      app.clone(),
      "POST",
      "/numbers",
      Some(json!({ "phone_number": "+15125550002" })),
    )
    .await;
    let id = entry["number_id"].as_str().unwrap().to_owned();

    let (status, retired) =
      send(app.clone(), "POST", &format!("/numbers/{id}/retire"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retired["status"], "retired");

    let (status, active) =
      send(app.clone(), "POST", &format!("/numbers/{id}/reactivate"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["status"], "active");
    assert_eq!(active["calls_this_hour"], 0);

    let (status, reset) = send(app.clone(), "POST", "/numbers/reset-hourly", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reset["reset"], 1);

    let missing = uuid::Uuid::new_v4();
    let (status, _) =
      send(app, "POST", &format!("/numbers/{missing}/retire"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Stats ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rolling_stats_survive_an_empty_store() {
    let app = app().await;
    let (status, rolling) = send(app, "GET", "/stats/rolling?days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rolling["days_with_data"], 0);
    assert_eq!(rolling["demo_rate"], 0.0);
    assert_eq!(rolling["contact_rate"], 0.0);
  }

  #[tokio::test]
  async fn stats_adjust_bumps_the_administrative_counters() {
    let app = app().await;

    let (status, row) = send(
      app,
      "POST",
      "/stats/adjust",
      Some(json!({
        "date": "2024-03-01",
        "demos_held": 1,
        "deals_closed": 1,
        "hours_dialed": 2.5,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["demos_held"], 1);
    assert_eq!(row["deals_closed"], 1);
    assert_eq!(row["total_dials"], 0);
  }

  // ── Webhooks ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn voice_webhook_records_and_tolerates_unknowns() {
    let app = app().await;

    let (status, _) = send(
      app.clone(),
      "POST",
      "/webhooks/voice",
      Some(json!({ "call_sid": "CA42", "call_status": "ringing" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Unknown provider vocabulary is dropped, still acknowledged.
    let (status, _) = send(
      app,
      "POST",
      "/webhooks/voice",
      Some(json!({ "call_sid": "CA42", "call_status": "machine-detected" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn spam_webhook_retires_a_number_past_the_limit() {
    let app = app().await;

    send(
      app.clone(),
      "POST",
      "/numbers",
      Some(json!({ "phone_number": "+15125550003" })),
    )
    .await;

    for _ in 0..3 {
      let (status, _) = send(
        app.clone(),
        "POST",
        "/webhooks/spam-report",
        Some(json!({ "phone_number": "+15125550003" })),
      )
      .await;
      assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, numbers) = send(app, "GET", "/numbers?status=retired", None).await;
    assert_eq!(numbers.as_array().unwrap().len(), 1);
  }
}
