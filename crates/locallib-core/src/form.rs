//! Raw form input and the candidate entities rebuilt from it.
//!
//! A candidate carries the submitted values after sanitisation (trimmed and
//! HTML-escaped), plus the target identity when editing an existing entity.
//! It is what a form is re-rendered with when validation fails, so the user
//! sees their own input next to the error messages. Candidates built from a
//! stored entity pre-populate the update forms.
//!
//! Candidates are never persisted directly; [`crate::validate`] turns them
//! into the typed `New*` inputs the store accepts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  author::Author,
  book::Book,
  book_instance::BookInstance,
  genre::Genre,
  id::{AuthorId, BookId, BookInstanceId, GenreId},
  validate::sanitize,
};

// ─── Raw input ───────────────────────────────────────────────────────────────

/// Submitted key/value pairs in submission order. Keys may repeat (a book's
/// `genre` checkboxes submit one pair per checked genre).
#[derive(Debug, Clone, Default)]
pub struct FormData {
  pairs: Vec<(String, String)>,
}

impl FormData {
  pub fn new(pairs: Vec<(String, String)>) -> Self { Self { pairs } }

  /// The first value submitted under `key`.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .pairs
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  /// Every value submitted under `key`, in order.
  pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .pairs
      .iter()
      .filter(move |(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  fn sanitized(&self, key: &str) -> String {
    sanitize(self.get(key).unwrap_or_default())
  }

  fn trimmed(&self, key: &str) -> String {
    self.get(key).unwrap_or_default().trim().to_owned()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

fn date_input(d: Option<NaiveDate>) -> String {
  d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

// ─── Author ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorForm {
  pub id:            Option<AuthorId>,
  pub first_name:    String,
  pub family_name:   String,
  /// Dates are trimmed but not escaped; they are only ever parsed.
  pub date_of_birth: String,
  pub date_of_death: String,
}

impl AuthorForm {
  pub fn from_input(input: &FormData, id: Option<AuthorId>) -> Self {
    Self {
      id,
      first_name: input.sanitized("first_name"),
      family_name: input.sanitized("family_name"),
      date_of_birth: input.trimmed("date_of_birth"),
      date_of_death: input.trimmed("date_of_death"),
    }
  }

  pub fn from_author(author: &Author) -> Self {
    Self {
      id:            Some(author.id),
      first_name:    author.first_name.clone(),
      family_name:   author.family_name.clone(),
      date_of_birth: date_input(author.date_of_birth),
      date_of_death: date_input(author.date_of_death),
    }
  }
}

// ─── Genre ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenreForm {
  pub id:   Option<GenreId>,
  pub name: String,
}

impl GenreForm {
  pub fn from_input(input: &FormData, id: Option<GenreId>) -> Self {
    Self { id, name: input.sanitized("name") }
  }

  pub fn from_genre(genre: &Genre) -> Self {
    Self { id: Some(genre.id), name: genre.name.clone() }
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookForm {
  pub id:      Option<BookId>,
  pub title:   String,
  /// The selected author's identity, as submitted.
  pub author:  String,
  pub summary: String,
  pub isbn:    String,
  /// Checked genre identities, as submitted.
  pub genre:   Vec<String>,
}

impl BookForm {
  pub fn from_input(input: &FormData, id: Option<BookId>) -> Self {
    Self {
      id,
      title: input.sanitized("title"),
      author: input.sanitized("author"),
      summary: input.sanitized("summary"),
      isbn: input.sanitized("isbn"),
      genre: input.get_all("genre").map(sanitize).collect(),
    }
  }

  pub fn from_book(book: &Book) -> Self {
    Self {
      id:      Some(book.id),
      title:   book.title.clone(),
      author:  book.author.to_string(),
      summary: book.summary.clone(),
      isbn:    book.isbn.clone(),
      genre:   book.genre.iter().map(ToString::to_string).collect(),
    }
  }

  pub fn has_genre(&self, id: GenreId) -> bool {
    let id = id.to_string();
    self.genre.iter().any(|g| *g == id)
  }

  pub fn has_author(&self, id: AuthorId) -> bool { self.author == id.to_string() }
}

// ─── BookInstance ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInstanceForm {
  pub id:       Option<BookInstanceId>,
  pub book:     String,
  pub imprint:  String,
  pub status:   String,
  pub due_back: String,
}

impl BookInstanceForm {
  pub fn from_input(input: &FormData, id: Option<BookInstanceId>) -> Self {
    Self {
      id,
      book: input.sanitized("book"),
      imprint: input.sanitized("imprint"),
      status: input.sanitized("status"),
      due_back: input.trimmed("due_back"),
    }
  }

  pub fn from_instance(instance: &BookInstance) -> Self {
    Self {
      id:       Some(instance.id),
      book:     instance.book.to_string(),
      imprint:  instance.imprint.clone(),
      status:   instance.status.to_string(),
      due_back: date_input(instance.due_back),
    }
  }

  pub fn has_book(&self, id: BookId) -> bool { self.book == id.to_string() }
}
