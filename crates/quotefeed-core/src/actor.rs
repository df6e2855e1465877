//! Actors: the identity on whose behalf a feed is requested.
//!
//! An actor is either a registered account or an anonymous visitor carrying a
//! durable pseudo-identity. The two are never merged by this crate.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Opaque, stable identity of an actor.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl ActorId {
  /// Mint a fresh random identity.
  pub fn mint() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for ActorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.hyphenated().fmt(f)
  }
}

impl From<Uuid> for ActorId {
  fn from(id: Uuid) -> Self { Self(id) }
}

/// Account role, as stored in the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
  /// Anonymous visitors that have recorded at least one interaction.
  Guest,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::User => "user",
      Role::Admin => "admin",
      Role::Guest => "guest",
    }
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "user" => Ok(Role::User),
      "admin" => Ok(Role::Admin),
      "guest" => Ok(Role::Guest),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

/// What the auth context provider yields for an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
  pub actor_id:    ActorId,
  pub role:        Role,
  pub is_verified: bool,
}

/// The resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
  Registered(AuthContext),
  Anonymous {
    id:     ActorId,
    /// `true` when the id was minted for this request and must be handed
    /// back to the caller.
    minted: bool,
  },
}

impl Actor {
  pub fn id(&self) -> ActorId {
    match self {
      Actor::Registered(ctx) => ctx.actor_id,
      Actor::Anonymous { id, .. } => *id,
    }
  }

  pub fn is_registered(&self) -> bool { matches!(self, Actor::Registered(_)) }
}

/// A row of the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            ActorId,
  pub email:         Option<String>,
  /// argon2 PHC string; `None` for guest rows.
  #[serde(skip_serializing)]
  pub password_hash: Option<String>,
  pub role:          Role,
  pub is_verified:   bool,
  pub created_at:    DateTime<Utc>,
}

impl User {
  pub fn auth_context(&self) -> AuthContext {
    AuthContext {
      actor_id:    self.id,
      role:        self.role,
      is_verified: self.is_verified,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minted_ids_differ() {
    assert_ne!(ActorId::mint(), ActorId::mint());
  }

  #[test]
  fn role_parses_known_values() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("guest".parse::<Role>().unwrap(), Role::Guest);
    assert!(matches!("root".parse::<Role>(), Err(Error::UnknownRole(_))));
  }

  #[test]
  fn actor_id_accessor() {
    let id = ActorId::mint();
    let anon = Actor::Anonymous { id, minted: true };
    assert_eq!(anon.id(), id);
    assert!(!anon.is_registered());

    let reg = Actor::Registered(AuthContext {
      actor_id:    id,
      role:        Role::User,
      is_verified: false,
    });
    assert_eq!(reg.id(), id);
    assert!(reg.is_registered());
  }
}
