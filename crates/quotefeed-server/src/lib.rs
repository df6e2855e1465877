//! HTTP server assembly for the quote feed.
//!
//! Owns the runtime configuration and wires the API router together with the
//! health endpoints and request tracing.

use std::path::PathBuf;

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use chrono::Utc;
use quotefeed_api::{ApiState, CookiePolicy, api_router};
use quotefeed_core::{config::FeedConfig, store::FeedStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUOTEFEED_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  #[serde(default)]
  pub cookie_secure: CookiePolicy,
  #[serde(default)]
  pub feed:          FeedConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("quotefeed.sqlite3") }

impl ServerConfig {
  /// Layer the optional TOML file under environment overrides.
  ///
  /// Nested keys use `__`, e.g. `QUOTEFEED_FEED__LIKE_WEIGHT=4`.
  pub fn load(path: PathBuf) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("QUOTEFEED")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> Json<Value> {
  Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

/// Build the complete application router: `/health`, and the API under `/api`.
pub fn app<S>(store: std::sync::Arc<S>, config: &ServerConfig) -> Router
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  let state = ApiState::new(store, config.feed.clone(), config.cookie_secure);

  Router::new()
    .route("/health", get(health))
    .nest("/api", api_router(state).route("/health", get(health)))
    .layer(TraceLayer::new_for_http())
}
