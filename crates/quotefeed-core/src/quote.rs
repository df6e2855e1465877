//! Quotes and the two-level category taxonomy they live in.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, actor::ActorId};

pub type QuoteId = i64;
pub type CategoryId = i64;
pub type SubcategoryId = i64;

// ─── Taxonomy ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   CategoryId,
  pub name: String,
}

/// A subcategory's parent category is fixed once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
  pub id:          SubcategoryId,
  pub category_id: CategoryId,
  pub name:        String,
}

// ─── Visibility ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  #[default]
  Public,
  Unlisted,
  Private,
}

impl Visibility {
  pub fn as_str(self) -> &'static str {
    match self {
      Visibility::Public => "public",
      Visibility::Unlisted => "unlisted",
      Visibility::Private => "private",
    }
  }
}

impl FromStr for Visibility {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "public" => Ok(Visibility::Public),
      "unlisted" => Ok(Visibility::Unlisted),
      "private" => Ok(Visibility::Private),
      other => Err(Error::UnknownVisibility(other.to_owned())),
    }
  }
}

// ─── Quotes ──────────────────────────────────────────────────────────────────

/// Input for creating a quote. The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewQuote {
  pub text:             String,
  pub author:           Option<String>,
  pub subcategory_id:   SubcategoryId,
  pub background_color: Option<String>,
  pub text_color:       Option<String>,
  pub font_family:      Option<String>,
  /// `None` mirrors rows written before visibility existed.
  pub visibility:       Option<Visibility>,
  pub user_id:          Option<ActorId>,
}

impl NewQuote {
  /// A public quote with no styling or owner.
  pub fn new(text: impl Into<String>, subcategory_id: SubcategoryId) -> Self {
    Self {
      text: text.into(),
      author: None,
      subcategory_id,
      background_color: None,
      text_color: None,
      font_family: None,
      visibility: Some(Visibility::Public),
      user_id: None,
    }
  }
}

/// A quote joined with its subcategory and category display names; the shape
/// returned by every feed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedQuote {
  pub id:               QuoteId,
  pub text:             String,
  pub author:           Option<String>,
  pub subcategory_id:   SubcategoryId,
  pub background_color: Option<String>,
  pub text_color:       Option<String>,
  pub font_family:      Option<String>,
  pub visibility:       Option<Visibility>,
  pub user_id:          Option<ActorId>,
  pub created_at:       DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at:       Option<DateTime<Utc>>,
  pub category_id:      CategoryId,
  pub category_name:    String,
  pub subcategory_name: String,
}
