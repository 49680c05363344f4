//! Authors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{date::format_medium, id::AuthorId};

/// A persisted author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  pub id:            AuthorId,
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<NaiveDate>,
  pub date_of_death: Option<NaiveDate>,
}

impl Author {
  /// Display name, `"family_name, first_name"`.
  pub fn name(&self) -> String {
    format!("{}, {}", self.family_name, self.first_name)
  }

  /// `"<birth> - <death>"`. An unknown birth date reads `Unknown`; an absent
  /// death date is left empty.
  pub fn lifespan(&self) -> String {
    let birth = self
      .date_of_birth
      .map(format_medium)
      .unwrap_or_else(|| "Unknown".to_owned());
    let death = self.date_of_death.map(format_medium).unwrap_or_default();
    format!("{birth} - {death}")
  }

  pub fn date_of_birth_formatted(&self) -> Option<String> {
    self.date_of_birth.map(format_medium)
  }

  pub fn date_of_death_formatted(&self) -> Option<String> {
    self.date_of_death.map(format_medium)
  }

  /// Canonical location of the author's detail view.
  pub fn url(&self) -> String { format!("/catalog/author/{}", self.id) }
}

/// Validated author fields, accepted by create and update. The identity is
/// never part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<NaiveDate>,
  pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
  pub fn into_author(self, id: AuthorId) -> Author {
    Author {
      id,
      first_name: self.first_name,
      family_name: self.family_name,
      date_of_birth: self.date_of_birth,
      date_of_death: self.date_of_death,
    }
  }
}
