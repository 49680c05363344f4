//! Typed identities for catalog entities.
//!
//! Every entity is keyed by a server-assigned UUID v4. Wrapping the UUID per
//! entity keeps a `BookId` from ever being passed where an `AuthorId` is
//! expected.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

macro_rules! entity_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(Uuid);

    impl $name {
      /// Allocate a fresh random identity.
      pub fn new() -> Self { Self(Uuid::new_v4()) }

      pub const fn from_uuid(id: Uuid) -> Self { Self(id) }

      pub const fn as_uuid(&self) -> Uuid { self.0 }
    }

    impl Default for $name {
      fn default() -> Self { Self::new() }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
      }
    }

    impl FromStr for $name {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
          .map(Self)
          .map_err(|e| Error::InvalidId(s.to_owned(), e))
      }
    }
  };
}

entity_id!(
  /// Identity of an [`Author`](crate::author::Author).
  AuthorId
);
entity_id!(
  /// Identity of a [`Genre`](crate::genre::Genre).
  GenreId
);
entity_id!(
  /// Identity of a [`Book`](crate::book::Book).
  BookId
);
entity_id!(
  /// Identity of a [`BookInstance`](crate::book_instance::BookInstance).
  BookInstanceId
);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_round_trips_through_from_str() {
    let id = AuthorId::new();
    let parsed: AuthorId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
  }

  #[test]
  fn from_str_rejects_garbage() {
    let err = "not-a-uuid".parse::<GenreId>().unwrap_err();
    assert!(matches!(err, Error::InvalidId(ref s, _) if s == "not-a-uuid"));
  }
}
