//! Handler for `POST /interactions`.
//!
//! Body: `{"quoteId": 12, "interactionType": "like"}`. Guests are recorded
//! against their cookie id; a `users` row is created for them on first use.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::HeaderMap,
};
use quotefeed_core::{
  actor::ActorId,
  interaction::{InteractionType, NewInteraction},
  quote::QuoteId,
  store::FeedStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{ApiState, actor::ResolvedActor, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionBody {
  pub quote_id:         QuoteId,
  pub interaction_type: InteractionType,
}

/// `POST /interactions`
///
/// A freshly minted guest cookie is sent back with every outcome, rejections
/// included.
pub async fn record<S>(
  State(state): State<ApiState<S>>,
  resolved: ResolvedActor,
  body: Result<Json<InteractionBody>, JsonRejection>,
) -> (HeaderMap, Result<Json<Value>, ApiError>)
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  (resolved.response_headers(), record_for(&state, resolved.id(), body).await)
}

async fn record_for<S>(
  state: &ApiState<S>,
  actor_id: ActorId,
  body: Result<Json<InteractionBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: FeedStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  if body.quote_id <= 0 {
    return Err(ApiError::BadRequest("quoteId must be a positive integer".into()));
  }

  if !state.store.quote_exists(body.quote_id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("quote {} not found", body.quote_id)));
  }

  state.store.ensure_actor(actor_id).await.map_err(ApiError::store)?;
  let interaction = state
    .store
    .record_interaction(NewInteraction {
      actor_id,
      quote_id: body.quote_id,
      interaction_type: body.interaction_type,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(
    actor = %actor_id,
    quote = interaction.quote_id,
    kind = interaction.interaction_type.as_str(),
    "recorded interaction"
  );

  Ok(Json(json!({ "success": true })))
}
