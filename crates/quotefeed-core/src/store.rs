//! The `FeedStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `quotefeed-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  actor::{ActorId, User},
  interaction::{Interaction, InteractionRecord, NewInteraction},
  quote::{CategoryId, FeedQuote, QuoteId},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Which categories a candidate fetch draws from.
///
/// Category ids are always passed to the backend as bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryScope {
  /// Every category.
  All,
  /// Only quotes whose parent category is in the list.
  Within(Vec<CategoryId>),
  /// Only quotes whose parent category is not in the list.
  Outside(Vec<CategoryId>),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store behind the feed.
///
/// Every quote read here is feed-facing: implementations must apply the
/// visibility guard (see [`crate::visibility`]) to each of them.
pub trait FeedStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Interaction ledger ────────────────────────────────────────────────

  /// Up to `limit` most recent interactions of `actor`, newest first, each
  /// paired with the category owning the quote. Records whose taxonomy chain
  /// no longer resolves are omitted.
  fn recent_interactions(
    &self,
    actor: ActorId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<InteractionRecord>, Self::Error>> + Send + '_;

  /// Append an interaction. The `created_at` timestamp is set by the store.
  fn record_interaction(
    &self,
    input: NewInteraction,
  ) -> impl Future<Output = Result<Interaction, Self::Error>> + Send + '_;

  // ── Quotes ────────────────────────────────────────────────────────────

  /// Number of visible quotes in `scope`.
  fn count_candidates(
    &self,
    scope: CategoryScope,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The visible quotes of `scope` at the given zero-based `ranks`, where
  /// rank follows ascending quote id. Each row is paired with its rank; ranks
  /// past the end of the scope are skipped, so at most `ranks.len()` rows come
  /// back. Order is unspecified.
  fn candidates_at(
    &self,
    scope: CategoryScope,
    ranks: Vec<usize>,
  ) -> impl Future<Output = Result<Vec<(usize, FeedQuote)>, Self::Error>> + Send + '_;

  /// Up to `limit` visible quotes, newest first.
  fn latest_quotes(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<FeedQuote>, Self::Error>> + Send + '_;

  /// `true` if a quote with this id exists and is not soft-deleted.
  fn quote_exists(
    &self,
    id: QuoteId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Actors ────────────────────────────────────────────────────────────

  /// Look up a registered account by email.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Make sure a `users` row exists for `actor`, inserting a guest row if
  /// not. Existing rows are left untouched.
  fn ensure_actor(
    &self,
    actor: ActorId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
