//! The bundled auth context provider: HTTP Basic credentials checked against
//! the argon2 hashes in the `users` table.
//!
//! Issuing credentials is not handled here. A request without an
//! `Authorization` header is simply unauthenticated.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use quotefeed_core::{actor::AuthContext, store::FeedStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  #[error("malformed authorization header")]
  Malformed,
  #[error("unknown user")]
  UnknownUser,
  #[error("bad password")]
  BadPassword,
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("password verification task failed: {0}")]
  Verify(#[from] tokio::task::JoinError),
}

/// Split a `Basic` authorization header into `(email, password)`.
///
/// Returns `Ok(None)` when no `Authorization` header is present.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, AuthError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let encoded = value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(AuthError::Malformed)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| AuthError::Malformed)?;
  let creds   = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

  let (email, password) = creds.split_once(':').ok_or(AuthError::Malformed)?;
  Ok(Some((email.to_owned(), password.to_owned())))
}

/// Verify the request's credentials against `store`.
///
/// `Ok(None)` means the request carried no credentials at all.
pub async fn authenticate<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Option<AuthContext>, AuthError>
where
  S: FeedStore,
{
  let Some((email, password)) = basic_credentials(headers)? else {
    return Ok(None);
  };

  let user = store
    .find_user_by_email(&email)
    .await
    .map_err(|e| AuthError::Store(Box::new(e)))?
    .ok_or(AuthError::UnknownUser)?;

  let hash = user.password_hash.clone().ok_or(AuthError::BadPassword)?;

  // argon2 is CPU-bound; run it on the blocking pool.
  tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;

  Ok(Some(user.auth_context()))
}

/// Check `password` against an argon2 PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
  let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::BadPassword)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| AuthError::BadPassword)
}
