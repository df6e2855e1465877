//! Interactions: append-only facts about an actor engaging with a quote.
//!
//! Interactions are never updated or deleted. They are the sole input to
//! affinity scoring.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  actor::ActorId,
  quote::{CategoryId, QuoteId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
  View,
  Like,
  Share,
  Remix,
}

impl InteractionType {
  pub fn as_str(self) -> &'static str {
    match self {
      InteractionType::View => "view",
      InteractionType::Like => "like",
      InteractionType::Share => "share",
      InteractionType::Remix => "remix",
    }
  }
}

impl FromStr for InteractionType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "view" => Ok(InteractionType::View),
      "like" => Ok(InteractionType::Like),
      "share" => Ok(InteractionType::Share),
      "remix" => Ok(InteractionType::Remix),
      other => Err(Error::UnknownInteractionType(other.to_owned())),
    }
  }
}

/// Input for recording an interaction. `created_at` is set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
  pub actor_id:         ActorId,
  pub quote_id:         QuoteId,
  pub interaction_type: InteractionType,
}

/// A persisted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
  pub id:               i64,
  pub actor_id:         ActorId,
  pub quote_id:         QuoteId,
  pub interaction_type: InteractionType,
  pub created_at:       DateTime<Utc>,
}

/// One entry of the interaction ledger as read for scoring: the interaction
/// type and the category that owns the quote it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRecord {
  /// `None` when the stored type is not one this build recognises.
  pub interaction_type: Option<InteractionType>,
  pub category_id:      CategoryId,
}

impl InteractionRecord {
  pub fn new(interaction_type: InteractionType, category_id: CategoryId) -> Self {
    Self { interaction_type: Some(interaction_type), category_id }
  }
}
