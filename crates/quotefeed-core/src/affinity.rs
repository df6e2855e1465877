//! Affinity scoring: interaction history → ranked categories.
//!
//! Every record in the window counts at its full type weight. Recency only
//! decides which records are in the window; there is no decay.

use std::collections::BTreeMap;

use crate::{config::FeedConfig, interaction::InteractionRecord, quote::CategoryId};

/// Per-request category affinity. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryAffinity {
  /// Total points per category. A missing category has zero affinity.
  pub scores: BTreeMap<CategoryId, u64>,
  /// Category ids by descending score, ties by ascending id.
  pub ranked: Vec<CategoryId>,
}

impl CategoryAffinity {
  /// Accumulate weighted points per category over `records`.
  pub fn score(records: &[InteractionRecord], config: &FeedConfig) -> Self {
    let mut scores: BTreeMap<CategoryId, u64> = BTreeMap::new();
    for record in records {
      *scores.entry(record.category_id).or_default() +=
        config.weight(record.interaction_type);
    }

    let mut ranked: Vec<(CategoryId, u64)> =
      scores.iter().map(|(id, s)| (*id, *s)).collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| b.cmp(a).then(a_id.cmp(b_id)));

    Self {
      scores,
      ranked: ranked.into_iter().map(|(id, _)| id).collect(),
    }
  }

  pub fn is_empty(&self) -> bool { self.ranked.is_empty() }

  pub fn score_of(&self, category_id: CategoryId) -> u64 {
    self.scores.get(&category_id).copied().unwrap_or(0)
  }
}
