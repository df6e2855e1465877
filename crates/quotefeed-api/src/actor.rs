//! Actor identity resolution and the [`ResolvedActor`] extractor.
//!
//! Resolution never fails: an authenticated caller is a registered actor; any
//! other caller is anonymous, reusing a valid `wt_guest` cookie or minting a
//! fresh id that is handed back with `Set-Cookie`.

use std::convert::Infallible;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use quotefeed_core::{
  actor::{Actor, ActorId},
  store::FeedStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, auth};

/// Name of the anonymous identity cookie.
pub const GUEST_COOKIE: &str = "wt_guest";

/// One year, in seconds.
pub const GUEST_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// When the guest cookie carries the `Secure` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookiePolicy {
  /// Secure only when the request arrived over HTTPS.
  #[default]
  Auto,
  Always,
  Never,
}

impl CookiePolicy {
  pub fn secure(self, headers: &HeaderMap) -> bool {
    match self {
      CookiePolicy::Auto => is_https(headers),
      CookiePolicy::Always => true,
      CookiePolicy::Never => false,
    }
  }
}

/// The first `X-Forwarded-Proto` value, compared case-insensitively.
fn is_https(headers: &HeaderMap) -> bool {
  headers
    .get("x-forwarded-proto")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// The guest id carried by the request, if it is a hyphenated UUID.
pub fn guest_cookie(headers: &HeaderMap) -> Option<ActorId> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, _)| *name == GUEST_COOKIE)
    .and_then(|(_, value)| {
      let value = value.trim();
      (value.len() == 36).then(|| Uuid::try_parse(value).ok()).flatten()
    })
    .map(ActorId)
}

fn guest_set_cookie(id: ActorId, secure: bool) -> Option<HeaderValue> {
  let secure = if secure { "; Secure" } else { "" };
  HeaderValue::from_str(&format!(
    "{GUEST_COOKIE}={id}; Max-Age={GUEST_COOKIE_MAX_AGE}; Path=/; HttpOnly; SameSite=Lax{secure}"
  ))
  .ok()
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// The caller of a request plus any cookie that must be sent back.
#[derive(Debug, Clone)]
pub struct ResolvedActor {
  pub actor:      Actor,
  pub set_cookie: Option<HeaderValue>,
}

impl ResolvedActor {
  pub fn id(&self) -> ActorId { self.actor.id() }

  /// Response headers carrying the freshly minted guest cookie, if any.
  pub fn response_headers(&self) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = &self.set_cookie {
      headers.insert(header::SET_COOKIE, cookie.clone());
    }
    headers
  }
}

/// Resolve an anonymous caller from its cookie, minting an id if needed.
pub fn resolve_anonymous(headers: &HeaderMap, policy: CookiePolicy) -> ResolvedActor {
  if let Some(id) = guest_cookie(headers) {
    return ResolvedActor {
      actor:      Actor::Anonymous { id, minted: false },
      set_cookie: None,
    };
  }

  let id = ActorId::mint();
  ResolvedActor {
    actor:      Actor::Anonymous { id, minted: true },
    set_cookie: guest_set_cookie(id, policy.secure(headers)),
  }
}

/// Resolve the caller of a request. Never fails.
pub async fn resolve_actor<S>(
  headers: &HeaderMap,
  store: &S,
  policy: CookiePolicy,
) -> ResolvedActor
where
  S: FeedStore,
{
  match auth::authenticate(headers, store).await {
    Ok(Some(ctx)) => {
      return ResolvedActor { actor: Actor::Registered(ctx), set_cookie: None };
    }
    Ok(None) => {}
    Err(e) => tracing::debug!(error = %e, "ignoring credentials; treating caller as anonymous"),
  }
  resolve_anonymous(headers, policy)
}

impl<S> FromRequestParts<ApiState<S>> for ResolvedActor
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(resolve_actor(&parts.headers, state.store.as_ref(), state.cookies).await)
  }
}
