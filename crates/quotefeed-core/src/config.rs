//! Tunable feed parameters.

use serde::{Deserialize, Serialize};

use crate::interaction::InteractionType;

/// Weight applied to stored interaction types this build does not recognise.
pub const UNKNOWN_INTERACTION_WEIGHT: u64 = 1;

/// Interaction weights, history window and pool caps.
///
/// Deserialised from the `[feed]` table of the server configuration. Field
/// names are snake_case; the camelCase spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
  #[serde(alias = "viewWeight")]
  pub view_weight:          u64,
  #[serde(alias = "likeWeight")]
  pub like_weight:          u64,
  #[serde(alias = "shareWeight")]
  pub share_weight:         u64,
  #[serde(alias = "remixWeight")]
  pub remix_weight:         u64,
  /// How many of the most recent interactions feed the affinity scorer.
  #[serde(alias = "historyWindow")]
  pub history_window:       usize,
  #[serde(alias = "affinityPoolCap")]
  pub affinity_pool_cap:    usize,
  #[serde(alias = "exploratoryPoolCap")]
  pub exploratory_pool_cap: usize,
  #[serde(alias = "coldStartCap")]
  pub cold_start_cap:       usize,
  #[serde(alias = "discoveryCap")]
  pub discovery_cap:        usize,
  #[serde(alias = "latestCap")]
  pub latest_cap:           usize,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      view_weight:          1,
      like_weight:          3,
      share_weight:         4,
      remix_weight:         5,
      history_window:       100,
      affinity_pool_cap:    14,
      exploratory_pool_cap: 6,
      cold_start_cap:       20,
      discovery_cap:        30,
      latest_cap:           30,
    }
  }
}

impl FeedConfig {
  /// Points contributed by one interaction of the given type.
  pub fn weight(&self, interaction_type: Option<InteractionType>) -> u64 {
    match interaction_type {
      Some(InteractionType::View) => self.view_weight,
      Some(InteractionType::Like) => self.like_weight,
      Some(InteractionType::Share) => self.share_weight,
      Some(InteractionType::Remix) => self.remix_weight,
      None => UNKNOWN_INTERACTION_WEIGHT,
    }
  }

  /// Upper bound on the size of a personalised timeline.
  pub fn personalized_cap(&self) -> usize {
    self.affinity_pool_cap + self.exploratory_pool_cap
  }
}
