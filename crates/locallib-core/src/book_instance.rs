//! Book instances: the physical copies of a book held by the library.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  book::Book,
  date::format_medium,
  id::{BookId, BookInstanceId},
};

/// Circulation status of a copy.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum BookInstanceStatus {
  Available,
  #[default]
  Maintenance,
  Loaned,
  Reserved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInstance {
  pub id:       BookInstanceId,
  pub book:     BookId,
  pub imprint:  String,
  pub status:   BookInstanceStatus,
  pub due_back: Option<NaiveDate>,
}

impl BookInstance {
  pub fn url(&self) -> String { format!("/catalog/bookinstance/{}", self.id) }

  /// The due date only means something for copies that are out of
  /// circulation.
  pub fn shows_due_back(&self) -> bool {
    self.status != BookInstanceStatus::Available
  }

  pub fn due_back_formatted(&self) -> Option<String> {
    self.due_back.map(format_medium)
  }
}

/// Validated copy fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookInstance {
  pub book:     BookId,
  pub imprint:  String,
  pub status:   BookInstanceStatus,
  pub due_back: Option<NaiveDate>,
}

impl NewBookInstance {
  pub fn into_instance(self, id: BookInstanceId) -> BookInstance {
    BookInstance {
      id,
      book: self.book,
      imprint: self.imprint,
      status: self.status,
      due_back: self.due_back,
    }
  }
}

/// A copy with its book resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookInstanceDetail {
  pub instance: BookInstance,
  pub book:     Book,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn status_defaults_to_maintenance() {
    assert_eq!(BookInstanceStatus::default(), BookInstanceStatus::Maintenance);
  }

  #[test]
  fn status_parses_from_display_name() {
    for status in BookInstanceStatus::iter() {
      assert_eq!(status.to_string().parse::<BookInstanceStatus>().unwrap(), status);
    }
    assert!("Lost".parse::<BookInstanceStatus>().is_err());
  }

  #[test]
  fn due_back_hidden_when_available() {
    let mut copy = BookInstance {
      id:       BookInstanceId::new(),
      book:     BookId::new(),
      imprint:  "Penguin, 2003".into(),
      status:   BookInstanceStatus::Available,
      due_back: NaiveDate::from_ymd_opt(2020, 10, 6),
    };
    assert!(!copy.shows_due_back());
    copy.status = BookInstanceStatus::Loaned;
    assert!(copy.shows_due_back());
    assert_eq!(copy.due_back_formatted().as_deref(), Some("Oct 6, 2020"));
  }
}
