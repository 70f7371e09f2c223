//! Server-side wiring for Cadence: configuration and the built-in hourly
//! pool reset task.

use std::{path::PathBuf, sync::Arc, time::Duration};

use cadence_core::store::DialerStore;
use serde::Deserialize;
use tokio::time::MissedTickBehavior;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` plus
/// `CADENCE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Run the in-process hourly pool counter reset. Deployments with an
  /// external scheduler hitting `/numbers/reset-hourly` turn this off.
  #[serde(default = "default_reset_task")]
  pub reset_task: bool,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8430 }
fn default_store_path() -> PathBuf { PathBuf::from("cadence.db") }
fn default_reset_task() -> bool { true }

// ─── Hourly reset task ────────────────────────────────────────────────────────

/// Zero the pool's hourly counters once an hour, forever.
///
/// The reset contract is owned by whatever trigger invokes it; this task is
/// the built-in option for deployments without an external cron. The manual
/// `/numbers/reset-hourly` endpoint stays available either way, and a daily
/// trigger can pass `reset_daily` through that endpoint.
pub async fn hourly_reset_task<S>(store: Arc<S>)
where
  S: DialerStore,
{
  let mut ticker = tokio::time::interval(Duration::from_secs(3600));
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  // The first tick completes immediately; skip it so startup isn't a reset.
  ticker.tick().await;

  loop {
    ticker.tick().await;
    match store.reset_hourly_counters(false).await {
      Ok(n) => tracing::info!(reset = n, "hourly pool counter reset"),
      Err(e) => tracing::warn!(error = %e, "hourly pool counter reset failed"),
    }
  }
}
