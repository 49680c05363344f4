//! Genres.

use serde::{Deserialize, Serialize};

use crate::id::GenreId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
  pub id:   GenreId,
  pub name: String,
}

impl Genre {
  pub fn url(&self) -> String { format!("/catalog/genre/{}", self.id) }
}

/// Validated genre fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGenre {
  pub name: String,
}
