//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use quotefeed_core::{
  actor::{ActorId, Role, User},
  interaction::InteractionType,
  quote::{FeedQuote, Visibility},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_actor(id: ActorId) -> String { id.0.hyphenated().to_string() }

pub fn decode_actor(s: &str) -> Result<ActorId> { Ok(ActorId(Uuid::parse_str(s)?)) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `quotes` row joined with its taxonomy, in
/// [`crate::schema::FEED_QUOTE_COLUMNS`] order.
pub struct RawFeedQuote {
  pub id:               i64,
  pub text:             String,
  pub author:           Option<String>,
  pub subcategory_id:   i64,
  pub background_color: Option<String>,
  pub text_color:       Option<String>,
  pub font_family:      Option<String>,
  pub visibility:       Option<String>,
  pub user_id:          Option<String>,
  pub created_at:       String,
  pub deleted_at:       Option<String>,
  pub category_id:      i64,
  pub category_name:    String,
  pub subcategory_name: String,
}

impl RawFeedQuote {
  /// Number of columns in [`crate::schema::FEED_QUOTE_COLUMNS`].
  pub const COLUMNS: usize = 14;

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      text:             row.get(1)?,
      author:           row.get(2)?,
      subcategory_id:   row.get(3)?,
      background_color: row.get(4)?,
      text_color:       row.get(5)?,
      font_family:      row.get(6)?,
      visibility:       row.get(7)?,
      user_id:          row.get(8)?,
      created_at:       row.get(9)?,
      deleted_at:       row.get(10)?,
      category_id:      row.get(11)?,
      category_name:    row.get(12)?,
      subcategory_name: row.get(13)?,
    })
  }

  pub fn into_feed_quote(self) -> Result<FeedQuote> {
    Ok(FeedQuote {
      id:               self.id,
      text:             self.text,
      author:           self.author,
      subcategory_id:   self.subcategory_id,
      background_color: self.background_color,
      text_color:       self.text_color,
      font_family:      self.font_family,
      visibility:       self
        .visibility
        .as_deref()
        .map(str::parse::<Visibility>)
        .transpose()?,
      user_id:          self.user_id.as_deref().map(decode_actor).transpose()?,
      created_at:       decode_dt(&self.created_at)?,
      deleted_at:       self.deleted_at.as_deref().map(decode_dt).transpose()?,
      category_id:      self.category_id,
      category_name:    self.category_name,
      subcategory_name: self.subcategory_name,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:            String,
  pub email:         Option<String>,
  pub password_hash: Option<String>,
  pub role:          String,
  pub is_verified:   bool,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      is_verified:   row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_actor(&self.id)?,
      email:         self.email,
      password_hash: self.password_hash,
      role:          self.role.parse::<Role>()?,
      is_verified:   self.is_verified,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Parse a stored interaction type; unrecognised values map to `None`.
pub fn decode_interaction_type(s: &str) -> Option<InteractionType> { s.parse().ok() }

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(500);
    let c = a + chrono::Duration::seconds(1);
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < eb && eb < ec, "{ea} {eb} {ec}");
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_interaction_types_decode_to_none() {
    assert_eq!(decode_interaction_type("remix"), Some(InteractionType::Remix));
    assert_eq!(decode_interaction_type("bookmark"), None);
  }
}
