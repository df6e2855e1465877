//! JSON REST API for the quote feed.
//!
//! Exposes an axum [`Router`] backed by any [`quotefeed_core::store::FeedStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quotefeed_api::api_router(state))
//! ```

pub mod actor;
pub mod auth;
pub mod error;
pub mod interactions;
pub mod quotes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quotefeed_core::{config::FeedConfig, store::FeedStore};

pub use actor::{CookiePolicy, ResolvedActor};
pub use error::ApiError;

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub feed:    Arc<FeedConfig>,
  pub cookies: CookiePolicy,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, feed: FeedConfig, cookies: CookiePolicy) -> Self {
    Self { store, feed: Arc::new(feed), cookies }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: FeedStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Feeds
    .route("/quotes/timeline", get(quotes::timeline::<S>))
    .route("/quotes/discovery", get(quotes::discovery::<S>))
    .route("/quotes/latest", get(quotes::latest::<S>))
    // Interaction recording
    .route("/interactions", post(interactions::record::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use quotefeed_core::{
    actor::{ActorId, Role, User},
    interaction::{Interaction, InteractionRecord, NewInteraction},
    quote::{CategoryId, FeedQuote, NewQuote, QuoteId, Visibility},
    store::CategoryScope,
  };
  use quotefeed_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;
  use crate::actor::GUEST_COOKIE;

  struct Fixture {
    store:     Arc<SqliteStore>,
    hearts:    CategoryId,
    hidden:    Vec<QuoteId>,
    first_art: QuoteId,
  }

  /// Two categories with 20 public quotes each, plus one private, one
  /// unlisted and one soft-deleted quote.
  async fn fixture() -> Fixture {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let hearts = store.add_category("Love").await.unwrap();
    let art = store.add_category("Art").await.unwrap();
    let sub_hearts = store.add_subcategory(hearts.id, "Romance").await.unwrap();
    let sub_art = store.add_subcategory(art.id, "Painting").await.unwrap();

    for i in 0..20 {
      store.add_quote(NewQuote::new(format!("love {i}"), sub_hearts.id)).await.unwrap();
    }
    let mut first_art = 0;
    for i in 0..20 {
      let q = store.add_quote(NewQuote::new(format!("art {i}"), sub_art.id)).await.unwrap();
      if i == 0 {
        first_art = q.id;
      }
    }

    let mut private = NewQuote::new("private", sub_art.id);
    private.visibility = Some(Visibility::Private);
    let private = store.add_quote(private).await.unwrap().id;

    let mut unlisted = NewQuote::new("unlisted", sub_hearts.id);
    unlisted.visibility = Some(Visibility::Unlisted);
    let unlisted = store.add_quote(unlisted).await.unwrap().id;

    let deleted = store.add_quote(NewQuote::new("deleted", sub_art.id)).await.unwrap().id;
    store.soft_delete_quote(deleted).await.unwrap();

    Fixture {
      store: Arc::new(store),
      hearts: hearts.id,
      hidden: vec![private, unlisted, deleted],
      first_art,
    }
  }

  fn app(store: Arc<SqliteStore>) -> Router {
    api_router(ApiState::new(store, FeedConfig::default(), CookiePolicy::Auto))
  }

  async fn send(
    router:  Router,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, String)>,
    body:    &str,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router.oneshot(req).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn feed(resp: Response) -> Vec<FeedQuote> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn guest_cookie_value(resp: &Response) -> String {
    let raw = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    let first = raw.split(';').next().unwrap();
    first.strip_prefix(&format!("{GUEST_COOKIE}=")).unwrap().to_string()
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  // ── Timeline ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_timeline_mints_cookie_and_cold_starts() {
    let fx = fixture().await;
    let resp = send(app(fx.store.clone()), "GET", "/quotes/timeline", vec![], "").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("Max-Age=31536000"), "{cookie}");

    let quotes = feed(resp).await;
    assert_eq!(quotes.len(), 20);
    assert!(quotes.iter().all(|q| !fx.hidden.contains(&q.id)));
    let ids: HashSet<QuoteId> = quotes.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), 20);
  }

  #[tokio::test]
  async fn returning_guest_keeps_identity() {
    let fx = fixture().await;
    let id = ActorId::mint();
    let resp = send(
      app(fx.store.clone()),
      "GET",
      "/quotes/timeline",
      vec![(header::COOKIE, format!("{GUEST_COOKIE}={id}"))],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
  }

  #[tokio::test]
  async fn secure_cookie_behind_https_proxy() {
    let fx = fixture().await;
    let resp = send(
      app(fx.store.clone()),
      "GET",
      "/quotes/timeline",
      vec![(header::HeaderName::from_static("x-forwarded-proto"), "https".into())],
      "",
    )
    .await;
    let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.ends_with("; Secure"), "{cookie}");
  }

  #[tokio::test]
  async fn guest_interactions_personalize_the_timeline() {
    let fx = fixture().await;

    // First visit mints the cookie.
    let first = send(app(fx.store.clone()), "GET", "/quotes/timeline", vec![], "").await;
    let guest = guest_cookie_value(&first);
    let cookie = format!("{GUEST_COOKIE}={guest}");

    let resp = send(
      app(fx.store.clone()),
      "POST",
      "/interactions",
      vec![
        (header::COOKIE, cookie.clone()),
        (header::CONTENT_TYPE, "application/json".into()),
      ],
      &format!(r#"{{"quoteId": {}, "interactionType": "like"}}"#, fx.first_art),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(json_body(resp).await["success"], true);

    let resp = send(
      app(fx.store.clone()),
      "GET",
      "/quotes/timeline",
      vec![(header::COOKIE, cookie)],
      "",
    )
    .await;
    let quotes = feed(resp).await;
    assert_eq!(quotes.len(), 20);
    let art = quotes.iter().filter(|q| q.category_name == "Art").count();
    let love = quotes.iter().filter(|q| q.category_id == fx.hearts).count();
    assert_eq!(art, 14);
    assert_eq!(love, 6);
  }

  #[tokio::test]
  async fn registered_user_is_resolved_from_basic_auth() {
    let fx = fixture().await;
    let user = fx.store.create_user("ada@example.com", hash("secret"), Role::User).await.unwrap();
    fx.store
      .record_interaction(NewInteraction {
        actor_id:         user.id,
        quote_id:         fx.first_art,
        interaction_type: quotefeed_core::interaction::InteractionType::Remix,
      })
      .await
      .unwrap();

    let resp = send(
      app(fx.store.clone()),
      "GET",
      "/quotes/timeline",
      vec![(header::AUTHORIZATION, basic("ada@example.com", "secret"))],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());

    let quotes = feed(resp).await;
    assert_eq!(quotes.iter().filter(|q| q.category_name == "Art").count(), 14);
  }

  #[tokio::test]
  async fn bad_credentials_degrade_to_guest() {
    let fx = fixture().await;
    fx.store.create_user("ada@example.com", hash("secret"), Role::User).await.unwrap();

    for auth in [basic("ada@example.com", "wrong"), basic("nobody@example.com", "x"), "Bearer t".into()] {
      let resp = send(
        app(fx.store.clone()),
        "GET",
        "/quotes/timeline",
        vec![(header::AUTHORIZATION, auth)],
        "",
      )
      .await;
      assert_eq!(resp.status(), StatusCode::OK);
      assert!(resp.headers().get(header::SET_COOKIE).is_some());
    }
  }

  // ── Discovery and latest ────────────────────────────────────────────────────

  #[tokio::test]
  async fn hidden_quotes_never_surface() {
    let fx = fixture().await;
    for uri in ["/quotes/timeline", "/quotes/discovery", "/quotes/latest"] {
      for _ in 0..5 {
        let resp = send(app(fx.store.clone()), "GET", uri, vec![], "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let quotes = feed(resp).await;
        assert!(quotes.iter().all(|q| !fx.hidden.contains(&q.id)), "{uri}");
        assert!(quotes.iter().all(|q| q.visibility == Some(Visibility::Public)));
      }
    }
  }

  #[tokio::test]
  async fn discovery_and_latest_are_capped_at_thirty() {
    let fx = fixture().await;
    let discovery = feed(send(app(fx.store.clone()), "GET", "/quotes/discovery", vec![], "").await).await;
    assert_eq!(discovery.len(), 30);

    let latest = feed(send(app(fx.store.clone()), "GET", "/quotes/latest", vec![], "").await).await;
    assert_eq!(latest.len(), 30);
    assert!(latest.windows(2).all(|w| w[0].created_at >= w[1].created_at));
  }

  #[tokio::test]
  async fn feed_json_carries_taxonomy_names() {
    let fx = fixture().await;
    let resp = send(app(fx.store.clone()), "GET", "/quotes/latest", vec![], "").await;
    let body = json_body(resp).await;
    let first = &body.as_array().unwrap()[0];
    for key in [
      "id", "text", "author", "subcategory_id", "background_color", "text_color",
      "font_family", "visibility", "user_id", "created_at", "category_name",
      "subcategory_name",
    ] {
      assert!(first.get(key).is_some(), "missing {key}");
    }
  }

  // ── Interactions ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn interaction_with_invalid_body_is_rejected() {
    let fx = fixture().await;
    for body in [
      r#"{"quoteId": 1, "interactionType": "bookmark"}"#,
      r#"{"quoteId": -3, "interactionType": "like"}"#,
      r#"{"interactionType": "like"}"#,
      "not json",
    ] {
      let resp = send(
        app(fx.store.clone()),
        "POST",
        "/interactions",
        vec![(header::CONTENT_TYPE, "application/json".into())],
        body,
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }
  }

  #[tokio::test]
  async fn interaction_with_unknown_quote_is_404() {
    let fx = fixture().await;
    let resp = send(
      app(fx.store.clone()),
      "POST",
      "/interactions",
      vec![(header::CONTENT_TYPE, "application/json".into())],
      r#"{"quoteId": 999999, "interactionType": "view"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Store failures ──────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("database is on fire")]
  struct Down;

  #[derive(Clone)]
  struct DownStore;

  impl FeedStore for DownStore {
    type Error = Down;
    async fn recent_interactions(&self, _: ActorId, _: usize) -> Result<Vec<InteractionRecord>, Down> { Err(Down) }
    async fn record_interaction(&self, _: NewInteraction) -> Result<Interaction, Down> { Err(Down) }
    async fn count_candidates(&self, _: CategoryScope) -> Result<usize, Down> { Err(Down) }
    async fn candidates_at(&self, _: CategoryScope, _: Vec<usize>) -> Result<Vec<(usize, FeedQuote)>, Down> { Err(Down) }
    async fn latest_quotes(&self, _: usize) -> Result<Vec<FeedQuote>, Down> { Err(Down) }
    async fn quote_exists(&self, _: QuoteId) -> Result<bool, Down> { Err(Down) }
    async fn find_user_by_email(&self, _: &str) -> Result<Option<User>, Down> { Err(Down) }
    async fn ensure_actor(&self, _: ActorId) -> Result<(), Down> { Err(Down) }
  }

  #[tokio::test]
  async fn store_failure_is_a_500_without_details() {
    let router = api_router(ApiState::new(Arc::new(DownStore), FeedConfig::default(), CookiePolicy::Auto));
    for uri in ["/quotes/timeline", "/quotes/discovery", "/quotes/latest"] {
      let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
      let resp = router.clone().oneshot(req).await.unwrap();
      assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
      let body = json_body(resp).await;
      assert_eq!(body["error"], "internal server error");
    }
  }

  #[tokio::test]
  async fn minted_cookie_survives_a_failed_timeline() {
    let router = api_router(ApiState::new(Arc::new(DownStore), FeedConfig::default(), CookiePolicy::Auto));
    let req = Request::builder().uri("/quotes/timeline").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!guest_cookie_value(&resp).is_empty());
  }

  #[tokio::test]
  async fn minted_cookie_survives_rejected_interactions() {
    let fx = fixture().await;
    for (body, status) in [
      ("not json", StatusCode::BAD_REQUEST),
      (r#"{"quoteId": 999999, "interactionType": "view"}"#, StatusCode::NOT_FOUND),
    ] {
      let resp = send(
        app(fx.store.clone()),
        "POST",
        "/interactions",
        vec![(header::CONTENT_TYPE, "application/json".into())],
        body,
      )
      .await;
      assert_eq!(resp.status(), status, "{body}");
      assert!(!guest_cookie_value(&resp).is_empty(), "{body}");
    }
  }

  #[tokio::test]
  async fn returning_guest_gets_no_cookie_on_rejection() {
    let fx = fixture().await;
    let resp = send(
      app(fx.store.clone()),
      "POST",
      "/interactions",
      vec![
        (header::COOKIE, format!("{GUEST_COOKIE}={}", ActorId::mint())),
        (header::CONTENT_TYPE, "application/json".into()),
      ],
      r#"{"quoteId": 999999, "interactionType": "view"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
  }
}
