//! SQL schema and shared query fragments for the SQLite store.
//!
//! Executed once at connection startup. The DDL is idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY,
    name  TEXT NOT NULL UNIQUE
);

-- A subcategory never moves to another category.
CREATE TABLE IF NOT EXISTS subcategories (
    id           INTEGER PRIMARY KEY,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    name         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id             TEXT PRIMARY KEY,
    email          TEXT UNIQUE,
    password_hash  TEXT,
    role           TEXT NOT NULL DEFAULT 'user',  -- 'user' | 'admin' | 'guest'
    is_verified    INTEGER NOT NULL DEFAULT 0,
    created_at     TEXT NOT NULL
);

-- visibility is nullable: rows written before the column existed are public.
CREATE TABLE IF NOT EXISTS quotes (
    id                INTEGER PRIMARY KEY,
    text              TEXT NOT NULL,
    author            TEXT,
    subcategory_id    INTEGER NOT NULL REFERENCES subcategories(id),
    background_color  TEXT,
    text_color        TEXT,
    font_family       TEXT,
    visibility        TEXT DEFAULT 'public'
                      CHECK (visibility IN ('public', 'unlisted', 'private')),
    user_id           TEXT REFERENCES users(id),
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    deleted_at        TEXT             -- soft deletion marker
);

-- Interactions are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS user_interactions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           TEXT NOT NULL REFERENCES users(id),
    quote_id          INTEGER NOT NULL REFERENCES quotes(id),
    interaction_type  TEXT NOT NULL,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS quotes_subcategory_idx   ON quotes(subcategory_id);
CREATE INDEX IF NOT EXISTS quotes_visibility_idx    ON quotes(visibility);
CREATE INDEX IF NOT EXISTS quotes_deleted_at_idx    ON quotes(deleted_at);
CREATE INDEX IF NOT EXISTS quotes_created_at_idx    ON quotes(created_at);
CREATE INDEX IF NOT EXISTS interactions_user_idx    ON user_interactions(user_id, created_at);

PRAGMA user_version = 1;
";

/// The visibility guard as a SQL predicate over the quote alias `q`.
pub const VISIBLE: &str =
  "q.deleted_at IS NULL AND COALESCE(q.visibility, 'public') = 'public'";

/// Quote columns joined with taxonomy names, in [`crate::encode::RawFeedQuote`]
/// order.
pub const FEED_QUOTE_COLUMNS: &str = "
    q.id, q.text, q.author, q.subcategory_id,
    q.background_color, q.text_color, q.font_family,
    q.visibility, q.user_id, q.created_at, q.deleted_at,
    c.id, c.name, s.name";

/// The taxonomy join shared by every quote read.
pub const FEED_QUOTE_JOIN: &str = "
    FROM quotes q
    JOIN subcategories s ON q.subcategory_id = s.id
    JOIN categories    c ON s.category_id    = c.id";
