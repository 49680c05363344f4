//! The response composer: rendered views, redirects, and the view models
//! they carry.
//!
//! HTML templating is out of this crate's hands. A rendered view is a JSON
//! document naming the view and carrying its data bag:
//!
//! ```json
//! { "view": "author_detail", "title": "Author Detail", "data": { ... } }
//! ```
//!
//! Values the page needs but the store does not hold (display names,
//! canonical URLs, which choices are pre-selected) are computed here, per
//! request, and never written back to the entities.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use locallib_core::{
  AuthorId, BookId, GenreId,
  author::Author,
  book::{Book, BookDetail, BookListing, BookSummary},
  book_instance::{BookInstance, BookInstanceDetail, BookInstanceStatus},
  form::{BookForm, BookInstanceForm},
  genre::Genre,
  validate::Violation,
};
use serde::Serialize;
use serde_json::{Value, json};
use strum::IntoEnumIterator as _;

// ─── Page ─────────────────────────────────────────────────────────────────────

/// What a handler produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
  /// Render `view` with `data`.
  Render {
    view:  &'static str,
    title: String,
    data:  Value,
  },
  /// Send the client to `url` (302 Found).
  Redirect(String),
}

impl Page {
  pub fn render(view: &'static str, title: impl Into<String>, data: Value) -> Self {
    Self::Render { view, title: title.into(), data }
  }

  pub fn redirect(url: impl Into<String>) -> Self { Self::Redirect(url.into()) }
}

impl IntoResponse for Page {
  fn into_response(self) -> Response {
    match self {
      Page::Render { view, title, data } => (
        StatusCode::OK,
        Json(json!({ "view": view, "title": title, "data": data })),
      )
        .into_response(),
      Page::Redirect(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
    }
  }
}

// ─── Entity view models ──────────────────────────────────────────────────────

pub fn author(a: &Author) -> Value {
  json!({
    "id":                      a.id,
    "first_name":              a.first_name,
    "family_name":             a.family_name,
    "name":                    a.name(),
    "lifespan":                a.lifespan(),
    "date_of_birth":           a.date_of_birth,
    "date_of_death":           a.date_of_death,
    "date_of_birth_formatted": a.date_of_birth_formatted(),
    "date_of_death_formatted": a.date_of_death_formatted(),
    "url":                     a.url(),
  })
}

pub fn genre(g: &Genre) -> Value {
  json!({ "id": g.id, "name": g.name, "url": g.url() })
}

pub fn book(b: &Book) -> Value {
  json!({
    "id":      b.id,
    "title":   b.title,
    "summary": b.summary,
    "isbn":    b.isbn,
    "author":  b.author,
    "genre":   b.genre,
    "url":     b.url(),
  })
}

/// A book with its author (and, for details, genres) inlined.
pub fn book_detail(d: &BookDetail) -> Value {
  let mut v = book(&d.book);
  v["author"] = author(&d.author);
  v["genre"] = Value::Array(d.genres.iter().map(genre).collect());
  v
}

pub fn book_listing(l: &BookListing) -> Value {
  let mut v = book(&l.book);
  v["author"] = author(&l.author);
  v
}

pub fn book_summary(b: &BookSummary) -> Value {
  json!({ "id": b.id, "title": b.title, "summary": b.summary, "url": b.url() })
}

pub fn book_instance(i: &BookInstance) -> Value {
  json!({
    "id":                 i.id,
    "book":               i.book,
    "imprint":            i.imprint,
    "status":             i.status,
    "due_back":           i.due_back,
    "due_back_formatted": i.shows_due_back().then(|| i.due_back_formatted()).flatten(),
    "url":                i.url(),
  })
}

pub fn book_instance_detail(d: &BookInstanceDetail) -> Value {
  let mut v = book_instance(&d.instance);
  v["book"] = book(&d.book);
  v
}

pub fn list<T>(items: &[T], f: impl Fn(&T) -> Value) -> Value {
  Value::Array(items.iter().map(f).collect())
}

pub fn errors(violations: &[Violation]) -> Value { json!(violations) }

// ─── Choice lists ────────────────────────────────────────────────────────────

/// An author offered on the book form.
#[derive(Debug, Serialize)]
pub struct AuthorChoice {
  pub id:       AuthorId,
  pub name:     String,
  pub selected: bool,
}

/// A genre offered on the book form; `checked` pre-selects its checkbox.
#[derive(Debug, Serialize)]
pub struct GenreChoice {
  pub id:      GenreId,
  pub name:    String,
  pub checked: bool,
}

/// A book offered on the copy form.
#[derive(Debug, Serialize)]
pub struct BookChoice {
  pub id:       BookId,
  pub title:    String,
  pub selected: bool,
}

/// A status offered on the copy form.
#[derive(Debug, Serialize)]
pub struct StatusChoice {
  pub value:    BookInstanceStatus,
  pub selected: bool,
}

pub fn author_choices(authors: &[Author], form: &BookForm) -> Vec<AuthorChoice> {
  authors
    .iter()
    .map(|a| AuthorChoice { id: a.id, name: a.name(), selected: form.has_author(a.id) })
    .collect()
}

pub fn genre_choices(genres: &[Genre], form: &BookForm) -> Vec<GenreChoice> {
  genres
    .iter()
    .map(|g| GenreChoice { id: g.id, name: g.name.clone(), checked: form.has_genre(g.id) })
    .collect()
}

pub fn book_choices(books: &[Book], form: &BookInstanceForm) -> Vec<BookChoice> {
  books
    .iter()
    .map(|b| BookChoice { id: b.id, title: b.title.clone(), selected: form.has_book(b.id) })
    .collect()
}

/// Every status, with the submitted one (or the default) selected.
pub fn status_choices(form: &BookInstanceForm) -> Vec<StatusChoice> {
  let current = form.status.parse().unwrap_or_default();
  BookInstanceStatus::iter()
    .map(|value| StatusChoice { value, selected: value == current })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn genre_choices_mark_submitted_genres() {
    let genres = vec![
      Genre { id: GenreId::new(), name: "Fantasy".into() },
      Genre { id: GenreId::new(), name: "Poetry".into() },
      Genre { id: GenreId::new(), name: "Romance".into() },
    ];
    let form = BookForm {
      genre: vec![genres[0].id.to_string(), genres[2].id.to_string()],
      ..BookForm::default()
    };

    let checked: Vec<bool> = genre_choices(&genres, &form).iter().map(|c| c.checked).collect();
    assert_eq!(checked, [true, false, true]);
  }

  #[test]
  fn status_choices_default_to_maintenance() {
    let choices = status_choices(&BookInstanceForm::default());
    let selected: Vec<_> = choices.iter().filter(|c| c.selected).map(|c| c.value).collect();
    assert_eq!(selected, [BookInstanceStatus::Maintenance]);
    assert_eq!(choices.len(), 4);
  }

  #[test]
  fn redirect_is_302_with_location() {
    let resp = Page::redirect("/catalog/authors").into_response();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[header::LOCATION], "/catalog/authors");
  }
}
