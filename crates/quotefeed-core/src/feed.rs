//! Feed composition: ledger → affinity → candidate pools → ordered feed.
//!
//! [`FeedEngine`] is constructed per request and holds nothing but borrowed
//! references to the store and the configuration. All randomness comes from
//! the RNG passed into each call.

use std::collections::HashMap;

use rand::Rng;

use crate::{
  actor::ActorId,
  affinity::CategoryAffinity,
  config::FeedConfig,
  interaction::InteractionRecord,
  quote::FeedQuote,
  sample,
  store::{CategoryScope, FeedStore},
  visibility,
};

// ─── Results ─────────────────────────────────────────────────────────────────

/// Which branch of the selector produced a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPath {
  /// No affinity signal: uniformly random visible quotes.
  ColdStart,
  /// Affinity-matched pool blended with an exploratory pool.
  Personalized,
}

/// Candidate pools chosen by the selector, before composition.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates {
  ColdStart(Vec<FeedQuote>),
  Personalized {
    matched:     Vec<FeedQuote>,
    exploratory: Vec<FeedQuote>,
  },
}

impl Candidates {
  pub fn path(&self) -> FeedPath {
    match self {
      Candidates::ColdStart(_) => FeedPath::ColdStart,
      Candidates::Personalized { .. } => FeedPath::Personalized,
    }
  }
}

/// A composed home timeline.
#[derive(Debug, Clone)]
pub struct Timeline {
  pub path:     FeedPath,
  pub affinity: CategoryAffinity,
  pub quotes:   Vec<FeedQuote>,
}

// ─── Composer ────────────────────────────────────────────────────────────────

/// Merge candidate pools into the final feed.
///
/// A cold-start list is already random and is returned untouched. The two
/// personalised pools are concatenated and shuffled once more so matched
/// items are not clustered at the front.
pub fn compose<R: Rng + ?Sized>(candidates: Candidates, rng: &mut R) -> Vec<FeedQuote> {
  match candidates {
    Candidates::ColdStart(quotes) => quotes,
    Candidates::Personalized { mut matched, exploratory } => {
      matched.extend(exploratory);
      sample::shuffle(&mut matched, rng);
      matched
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct FeedEngine<'a, S> {
  store:  &'a S,
  config: &'a FeedConfig,
}

impl<'a, S: FeedStore> FeedEngine<'a, S> {
  pub fn new(store: &'a S, config: &'a FeedConfig) -> Self { Self { store, config } }

  /// The bounded interaction window for `actor`. An unknown actor has none.
  pub async fn read_ledger(
    &self,
    actor: Option<ActorId>,
  ) -> Result<Vec<InteractionRecord>, S::Error> {
    match actor {
      Some(id) => self.store.recent_interactions(id, self.config.history_window).await,
      None => Ok(Vec::new()),
    }
  }

  /// Choose the candidate pools for an affinity. An empty affinity takes the
  /// cold-start path and never touches the matched/exploratory split.
  pub async fn select_candidates<R: Rng + Send>(
    &self,
    affinity: &CategoryAffinity,
    rng: &mut R,
  ) -> Result<Candidates, S::Error> {
    if affinity.is_empty() {
      let quotes = self
        .sample_pool(CategoryScope::All, self.config.cold_start_cap, rng)
        .await?;
      return Ok(Candidates::ColdStart(quotes));
    }

    let matched = self
      .sample_pool(
        CategoryScope::Within(affinity.ranked.clone()),
        self.config.affinity_pool_cap,
        rng,
      )
      .await?;
    let exploratory = self
      .sample_pool(
        CategoryScope::Outside(affinity.ranked.clone()),
        self.config.exploratory_pool_cap,
        rng,
      )
      .await?;

    Ok(Candidates::Personalized { matched, exploratory })
  }

  /// The personalised home timeline for `actor`.
  pub async fn timeline<R: Rng + Send>(
    &self,
    actor: Option<ActorId>,
    rng: &mut R,
  ) -> Result<Timeline, S::Error> {
    let history    = self.read_ledger(actor).await?;
    let affinity   = CategoryAffinity::score(&history, self.config);
    let candidates = self.select_candidates(&affinity, rng).await?;
    let path       = candidates.path();

    Ok(Timeline { path, affinity, quotes: compose(candidates, rng) })
  }

  /// Up to `discovery_cap` visible quotes in random order. No scoring.
  pub async fn discovery<R: Rng + Send>(
    &self,
    rng: &mut R,
  ) -> Result<Vec<FeedQuote>, S::Error> {
    self
      .sample_pool(CategoryScope::All, self.config.discovery_cap, rng)
      .await
  }

  /// Up to `latest_cap` visible quotes, newest first. No scoring.
  pub async fn latest(&self) -> Result<Vec<FeedQuote>, S::Error> {
    let mut quotes = self.store.latest_quotes(self.config.latest_cap).await?;
    quotes.retain(visibility::admits);
    Ok(quotes)
  }

  /// Sample up to `cap` visible quotes from `scope`, in sampled order.
  ///
  /// Only the count and the picked rows cross the store boundary, never the
  /// whole scope.
  async fn sample_pool<R: Rng + Send>(
    &self,
    scope: CategoryScope,
    cap: usize,
    rng: &mut R,
  ) -> Result<Vec<FeedQuote>, S::Error> {
    let total  = self.store.count_candidates(scope.clone()).await?;
    let picked = sample::ranks(total, cap, rng);
    if picked.is_empty() {
      return Ok(Vec::new());
    }

    let mut found: HashMap<usize, FeedQuote> = self
      .store
      .candidates_at(scope, picked.clone())
      .await?
      .into_iter()
      .filter(|(_, q)| visibility::admits(q))
      .collect();

    Ok(picked.into_iter().filter_map(|rank| found.remove(&rank)).collect())
  }
}
