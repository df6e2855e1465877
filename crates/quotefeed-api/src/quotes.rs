//! Handlers for the feed endpoints under `/quotes`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/quotes/timeline`  | Personalised per resolved actor; ≤ `cold_start_cap` / pool caps |
//! | `GET`  | `/quotes/discovery` | Random visible quotes; ≤ `discovery_cap` |
//! | `GET`  | `/quotes/latest`    | Visible quotes, newest first; ≤ `latest_cap` |

use axum::{Json, extract::State, http::HeaderMap};
use quotefeed_core::{feed::FeedEngine, quote::FeedQuote, store::FeedStore};
use rand::{SeedableRng, rngs::StdRng};

use crate::{ApiState, actor::ResolvedActor, error::ApiError};

/// A request-local RNG; nothing is shared between requests.
fn request_rng() -> StdRng { StdRng::from_entropy() }

// ─── Timeline ─────────────────────────────────────────────────────────────────

/// `GET /quotes/timeline`
///
/// A freshly minted guest cookie is sent back even when composition fails.
pub async fn timeline<S>(
  State(state): State<ApiState<S>>,
  resolved: ResolvedActor,
) -> (HeaderMap, Result<Json<Vec<FeedQuote>>, ApiError>)
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  (resolved.response_headers(), compose_timeline(&state, &resolved).await)
}

async fn compose_timeline<S>(
  state: &ApiState<S>,
  resolved: &ResolvedActor,
) -> Result<Json<Vec<FeedQuote>>, ApiError>
where
  S: FeedStore,
{
  let mut rng = request_rng();
  let engine  = FeedEngine::new(state.store.as_ref(), state.feed.as_ref());

  let timeline = engine
    .timeline(Some(resolved.id()), &mut rng)
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(
    actor = %resolved.id(),
    registered = resolved.actor.is_registered(),
    path = ?timeline.path,
    categories = timeline.affinity.ranked.len(),
    count = timeline.quotes.len(),
    "composed timeline"
  );

  Ok(Json(timeline.quotes))
}

// ─── Discovery ────────────────────────────────────────────────────────────────

/// `GET /quotes/discovery`
pub async fn discovery<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<FeedQuote>>, ApiError>
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  let mut rng = request_rng();
  let quotes = FeedEngine::new(state.store.as_ref(), state.feed.as_ref())
    .discovery(&mut rng)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(quotes))
}

// ─── Latest ───────────────────────────────────────────────────────────────────

/// `GET /quotes/latest`
pub async fn latest<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<FeedQuote>>, ApiError>
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  let quotes = FeedEngine::new(state.store.as_ref(), state.feed.as_ref())
    .latest()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(quotes))
}
