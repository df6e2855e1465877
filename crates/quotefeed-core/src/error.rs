//! Error types for `quotefeed-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown visibility: {0:?}")]
  UnknownVisibility(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown interaction type: {0:?}")]
  UnknownInteractionType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
