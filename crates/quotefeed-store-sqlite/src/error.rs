//! Error type for `quotefeed-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quotefeed_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("subcategory not found: {0}")]
  SubcategoryNotFound(i64),

  #[error("category not found: {0}")]
  CategoryNotFound(i64),

  #[error("quote not found: {0}")]
  QuoteNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
