//! Books and their read models.
//!
//! A [`Book`] references its author and genres by identity only. The
//! resolved shapes ([`BookDetail`], [`BookListing`]) are assembled on read and
//! never stored.

use serde::{Deserialize, Serialize};

use crate::{
  author::Author,
  genre::Genre,
  id::{AuthorId, BookId, GenreId},
};

// ─── Book ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
  pub id:      BookId,
  pub title:   String,
  pub summary: String,
  pub isbn:    String,
  pub author:  AuthorId,
  /// Unordered; may be empty.
  pub genre:   Vec<GenreId>,
}

impl Book {
  pub fn url(&self) -> String { book_url(self.id) }
}

/// Validated book fields. Update replaces every field, the genre set
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
  pub title:   String,
  pub summary: String,
  pub isbn:    String,
  pub author:  AuthorId,
  pub genre:   Vec<GenreId>,
}

impl NewBook {
  pub fn into_book(self, id: BookId) -> Book {
    Book {
      id,
      title: self.title,
      summary: self.summary,
      isbn: self.isbn,
      author: self.author,
      genre: self.genre,
    }
  }
}

fn book_url(id: BookId) -> String { format!("/catalog/book/{id}") }

// ─── Projections ─────────────────────────────────────────────────────────────

/// The minimal projection of a book shown where it appears as a dependent
/// (author detail, genre detail, delete confirmation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
  pub id:      BookId,
  pub title:   String,
  pub summary: String,
}

impl BookSummary {
  pub fn url(&self) -> String { book_url(self.id) }
}

/// A book with its author resolved, as shown in the book list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListing {
  pub book:   Book,
  pub author: Author,
}

/// A book with author and genres resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
  pub book:   Book,
  pub author: Author,
  pub genres: Vec<Genre>,
}
