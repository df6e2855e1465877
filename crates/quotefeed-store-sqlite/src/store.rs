//! [`SqliteStore`], the SQLite implementation of [`FeedStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use quotefeed_core::{
  actor::{ActorId, Role, User},
  interaction::{Interaction, InteractionRecord, NewInteraction},
  quote::{Category, CategoryId, FeedQuote, NewQuote, QuoteId, Subcategory, SubcategoryId},
  store::{CategoryScope, FeedStore},
};

use crate::{
  Error, Result,
  encode::{RawFeedQuote, RawUser, decode_interaction_type, encode_actor, encode_dt},
  schema::{FEED_QUOTE_COLUMNS, FEED_QUOTE_JOIN, SCHEMA, VISIBLE},
};

/// `?, ?, ?` with `n` anonymous parameters.
fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

/// The SQL filter and bound category ids for `scope`, or `None` when the
/// scope cannot match anything.
fn scope_filter(scope: CategoryScope) -> Option<(String, Vec<i64>)> {
  match scope {
    CategoryScope::Within(ids) if ids.is_empty() => None,
    CategoryScope::Within(ids) => {
      Some((format!("AND c.id IN ({})", placeholders(ids.len())), ids))
    }
    CategoryScope::Outside(ids) if !ids.is_empty() => {
      Some((format!("AND c.id NOT IN ({})", placeholders(ids.len())), ids))
    }
    CategoryScope::All | CategoryScope::Outside(_) => Some((String::new(), Vec::new())),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A quote feed store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests and fixtures.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn(&self) -> &tokio_rusqlite::Connection { &self.conn }

  // ── Taxonomy and authoring ────────────────────────────────────────────────
  //
  // These writes belong to the CRUD surface around the feed. They live here
  // so the server can seed data and tests can build fixtures.

  pub async fn add_category(&self, name: impl Into<String>) -> Result<Category> {
    let name = name.into();
    let name_c = name.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute("INSERT INTO categories (name) VALUES (?1)", rusqlite::params![name_c])?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Category { id, name })
  }

  pub async fn add_subcategory(
    &self,
    category_id: CategoryId,
    name: impl Into<String>,
  ) -> Result<Subcategory> {
    let name = name.into();
    let name_c = name.clone();

    let id = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM categories WHERE id = ?1",
            rusqlite::params![category_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO subcategories (category_id, name) VALUES (?1, ?2)",
          rusqlite::params![category_id, name_c],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?
      .ok_or(Error::CategoryNotFound(category_id))?;

    Ok(Subcategory { id, category_id, name })
  }

  /// Insert a quote and return it joined with its taxonomy.
  pub async fn add_quote(&self, input: NewQuote) -> Result<FeedQuote> {
    let subcategory_id: SubcategoryId = input.subcategory_id;
    let visibility = input.visibility.map(|v| v.as_str());
    let user_id    = input.user_id.map(encode_actor);
    let created_at = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM subcategories WHERE id = ?1",
            rusqlite::params![subcategory_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO quotes (
             text, author, subcategory_id, background_color, text_color,
             font_family, visibility, user_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            input.text,
            input.author,
            subcategory_id,
            input.background_color,
            input.text_color,
            input.font_family,
            visibility,
            user_id,
            created_at,
          ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?
      .ok_or(Error::SubcategoryNotFound(subcategory_id))?;

    self.get_quote(id).await?.ok_or(Error::QuoteNotFound(id))
  }

  /// Read a quote regardless of visibility or deletion. Owner- and
  /// admin-scoped; never used by the feed.
  pub async fn get_quote(&self, id: QuoteId) -> Result<Option<FeedQuote>> {
    let sql = format!("SELECT {FEED_QUOTE_COLUMNS} {FEED_QUOTE_JOIN} WHERE q.id = ?1");

    let raw: Option<RawFeedQuote> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawFeedQuote::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFeedQuote::into_feed_quote).transpose()
  }

  /// Mark a quote as soft-deleted. The row is kept.
  pub async fn soft_delete_quote(&self, id: QuoteId) -> Result<()> {
    let at = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE quotes SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
          rusqlite::params![at, id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::QuoteNotFound(id));
    }
    Ok(())
  }

  /// Insert a registered account.
  pub async fn create_user(
    &self,
    email: impl Into<String>,
    password_hash: impl Into<String>,
    role: Role,
  ) -> Result<User> {
    let user = User {
      id:            ActorId::mint(),
      email:         Some(email.into()),
      password_hash: Some(password_hash.into()),
      role,
      is_verified:   false,
      created_at:    Utc::now(),
    };

    let id_str   = encode_actor(user.id);
    let email    = user.email.clone();
    let hash     = user.password_hash.clone();
    let role_str = role.as_str();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (id, email, password_hash, role, is_verified, created_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![id_str, email, hash, role_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }
}

// ─── FeedStore impl ──────────────────────────────────────────────────────────

impl FeedStore for SqliteStore {
  type Error = Error;

  // ── Interaction ledger ────────────────────────────────────────────────────

  async fn recent_interactions(
    &self,
    actor: ActorId,
    limit: usize,
  ) -> Result<Vec<InteractionRecord>> {
    let actor_str = encode_actor(actor);
    let limit_val = limit as i64;
    let sql = format!(
      "SELECT c.id, ui.interaction_type
       FROM user_interactions ui
       JOIN quotes        q ON ui.quote_id       = q.id
       JOIN subcategories s ON q.subcategory_id  = s.id
       JOIN categories    c ON s.category_id     = c.id
       WHERE ui.user_id = ?1 AND {VISIBLE}
       ORDER BY ui.created_at DESC, ui.id DESC
       LIMIT ?2"
    );

    let rows: Vec<(CategoryId, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![actor_str, limit_val], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(category_id, kind)| InteractionRecord {
          interaction_type: decode_interaction_type(&kind),
          category_id,
        })
        .collect(),
    )
  }

  async fn record_interaction(&self, input: NewInteraction) -> Result<Interaction> {
    let created_at = Utc::now();

    let actor_str = encode_actor(input.actor_id);
    let quote_id  = input.quote_id;
    let kind      = input.interaction_type.as_str();
    let at_str    = encode_dt(created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_interactions (user_id, quote_id, interaction_type, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![actor_str, quote_id, kind, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Interaction {
      id,
      actor_id: input.actor_id,
      quote_id: input.quote_id,
      interaction_type: input.interaction_type,
      created_at,
    })
  }

  // ── Quotes ────────────────────────────────────────────────────────────────

  async fn count_candidates(&self, scope: CategoryScope) -> Result<usize> {
    let Some((filter, params)) = scope_filter(scope) else {
      return Ok(0);
    };
    let sql = format!("SELECT COUNT(*) {FEED_QUOTE_JOIN} WHERE {VISIBLE} {filter}");

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))?)
      })
      .await?;

    Ok(usize::try_from(count).unwrap_or(0))
  }

  async fn candidates_at(
    &self,
    scope: CategoryScope,
    ranks: Vec<usize>,
  ) -> Result<Vec<(usize, FeedQuote)>> {
    if ranks.is_empty() {
      return Ok(Vec::new());
    }
    let Some((filter, mut params)) = scope_filter(scope) else {
      return Ok(Vec::new());
    };
    // Scope placeholders come first in the text, then the ranks.
    let sql = format!(
      "WITH ranked AS (
         SELECT q.id AS quote_id, ROW_NUMBER() OVER (ORDER BY q.id) - 1 AS pos
         {FEED_QUOTE_JOIN}
         WHERE {VISIBLE} {filter}
       )
       SELECT {FEED_QUOTE_COLUMNS}, r.pos {FEED_QUOTE_JOIN}
       JOIN ranked r ON r.quote_id = q.id
       WHERE r.pos IN ({})",
      placeholders(ranks.len())
    );
    params.extend(ranks.iter().map(|&r| r as i64));

    let rows: Vec<(i64, RawFeedQuote)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok((row.get(RawFeedQuote::COLUMNS)?, RawFeedQuote::from_row(row)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(pos, raw)| Ok((pos as usize, raw.into_feed_quote()?)))
      .collect()
  }

  async fn latest_quotes(&self, limit: usize) -> Result<Vec<FeedQuote>> {
    let limit_val = limit as i64;
    let sql = format!(
      "SELECT {FEED_QUOTE_COLUMNS} {FEED_QUOTE_JOIN}
       WHERE {VISIBLE}
       ORDER BY q.created_at DESC, q.id DESC
       LIMIT ?1"
    );

    let raws: Vec<RawFeedQuote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawFeedQuote::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedQuote::into_feed_quote).collect()
  }

  async fn quote_exists(&self, id: QuoteId) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM quotes WHERE id = ?1 AND deleted_at IS NULL",
              rusqlite::params![id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  // ── Actors ────────────────────────────────────────────────────────────────

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, password_hash, role, is_verified, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn ensure_actor(&self, actor: ActorId) -> Result<()> {
    let id_str = encode_actor(actor);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO users (id, email, role, is_verified, created_at)
           VALUES (?1, NULL, 'guest', 0, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
