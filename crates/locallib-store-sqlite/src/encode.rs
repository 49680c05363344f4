//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings, calendar dates as
//! `YYYY-MM-DD`, and copy statuses by their display name.

use std::collections::HashMap;

use chrono::NaiveDate;
use locallib_core::{
  AuthorId, BookId, BookInstanceId, GenreId,
  author::Author,
  book::{Book, BookSummary},
  book_instance::{BookInstance, BookInstanceStatus},
  genre::Genre,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
  s.map(decode_date).transpose()
}

// ─── BookInstanceStatus ───────────────────────────────────────────────────────

pub fn encode_status(s: BookInstanceStatus) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<BookInstanceStatus> {
  s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Genre links ─────────────────────────────────────────────────────────────

/// `(book_id, genre_id)` rows from `book_genres`, grouped by book.
pub struct GenreLinks(HashMap<String, Vec<String>>);

impl GenreLinks {
  pub fn from_rows(rows: Vec<(String, String)>) -> Self {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (book_id, genre_id) in rows {
      map.entry(book_id).or_default().push(genre_id);
    }
    Self(map)
  }

  pub fn take(&mut self, book_id: &str) -> Vec<String> {
    self.0.remove(book_id).unwrap_or_default()
  }

  pub fn get(&self, book_id: &str) -> Vec<String> {
    self.0.get(book_id).cloned().unwrap_or_default()
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `authors` row.
pub struct RawAuthor {
  pub author_id:     String,
  pub first_name:    String,
  pub family_name:   String,
  pub date_of_birth: Option<String>,
  pub date_of_death: Option<String>,
}

impl RawAuthor {
  pub const COLUMNS: &'static str =
    "a.author_id, a.first_name, a.family_name, a.date_of_birth, a.date_of_death";

  /// Read the five author columns starting at `at`.
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      author_id:     row.get(at)?,
      first_name:    row.get(at + 1)?,
      family_name:   row.get(at + 2)?,
      date_of_birth: row.get(at + 3)?,
      date_of_death: row.get(at + 4)?,
    })
  }

  pub fn into_author(self) -> Result<Author> {
    Ok(Author {
      id:            AuthorId::from_uuid(decode_uuid(&self.author_id)?),
      first_name:    self.first_name,
      family_name:   self.family_name,
      date_of_birth: decode_opt_date(self.date_of_birth.as_deref())?,
      date_of_death: decode_opt_date(self.date_of_death.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `genres` row.
pub struct RawGenre {
  pub genre_id: String,
  pub name:     String,
}

impl RawGenre {
  pub const COLUMNS: &'static str = "g.genre_id, g.name";

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self { genre_id: row.get(at)?, name: row.get(at + 1)? })
  }

  pub fn into_genre(self) -> Result<Genre> {
    Ok(Genre {
      id:   GenreId::from_uuid(decode_uuid(&self.genre_id)?),
      name: self.name,
    })
  }
}

/// Raw strings read directly from a `books` row. The genre set lives in
/// `book_genres` and is attached on decode.
pub struct RawBook {
  pub book_id:   String,
  pub title:     String,
  pub summary:   String,
  pub isbn:      String,
  pub author_id: String,
}

impl RawBook {
  pub const COLUMNS: &'static str = "b.book_id, b.title, b.summary, b.isbn, b.author_id";

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:   row.get(at)?,
      title:     row.get(at + 1)?,
      summary:   row.get(at + 2)?,
      isbn:      row.get(at + 3)?,
      author_id: row.get(at + 4)?,
    })
  }

  pub fn into_book(self, genre_ids: Vec<String>) -> Result<Book> {
    let genre = genre_ids
      .iter()
      .map(|g| decode_uuid(g).map(GenreId::from_uuid))
      .collect::<Result<_>>()?;

    Ok(Book {
      id: BookId::from_uuid(decode_uuid(&self.book_id)?),
      title: self.title,
      summary: self.summary,
      isbn: self.isbn,
      author: AuthorId::from_uuid(decode_uuid(&self.author_id)?),
      genre,
    })
  }
}

/// Raw strings for the `(book_id, title, summary)` projection.
pub struct RawBookSummary {
  pub book_id: String,
  pub title:   String,
  pub summary: String,
}

impl RawBookSummary {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { book_id: row.get(0)?, title: row.get(1)?, summary: row.get(2)? })
  }

  pub fn into_summary(self) -> Result<BookSummary> {
    Ok(BookSummary {
      id:      BookId::from_uuid(decode_uuid(&self.book_id)?),
      title:   self.title,
      summary: self.summary,
    })
  }
}

/// Raw strings read directly from a `book_instances` row.
pub struct RawBookInstance {
  pub book_instance_id: String,
  pub book_id:          String,
  pub imprint:          String,
  pub status:           String,
  pub due_back:         Option<String>,
}

impl RawBookInstance {
  pub const COLUMNS: &'static str =
    "bi.book_instance_id, bi.book_id, bi.imprint, bi.status, bi.due_back";

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      book_instance_id: row.get(at)?,
      book_id:          row.get(at + 1)?,
      imprint:          row.get(at + 2)?,
      status:           row.get(at + 3)?,
      due_back:         row.get(at + 4)?,
    })
  }

  pub fn into_instance(self) -> Result<BookInstance> {
    Ok(BookInstance {
      id:       BookInstanceId::from_uuid(decode_uuid(&self.book_instance_id)?),
      book:     BookId::from_uuid(decode_uuid(&self.book_id)?),
      imprint:  self.imprint,
      status:   decode_status(&self.status)?,
      due_back: decode_opt_date(self.due_back.as_deref())?,
    })
  }
}
