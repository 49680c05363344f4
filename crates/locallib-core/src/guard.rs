//! Referential integrity: the deletion guard and write-time reference checks.
//!
//! Deletion is check-then-act. The dependents are read, and the delete is
//! issued only if there are none. The two steps are not transactional; a
//! dependent inserted between them is caught, if at all, by the backend's own
//! constraints.

use std::{convert::Infallible, future::Future};

use crate::{
  book::{BookSummary, NewBook},
  book_instance::{BookInstance, NewBookInstance},
  id::{AuthorId, BookId, BookInstanceId, GenreId},
  store::CatalogStore,
  validate::{AUTHOR_MISSING, BOOK_MISSING, GENRE_MISSING, Violation},
};

// ─── Deletion ────────────────────────────────────────────────────────────────

/// Result of a guarded delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome<D> {
  /// The entity is gone.
  Deleted,
  /// The entity still has dependents and was left untouched.
  Blocked(Vec<D>),
  /// No entity with that identity exists.
  NotFound,
}

async fn guarded<D, E, F, Fut>(dependents: Vec<D>, delete: F) -> Result<DeleteOutcome<D>, E>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<bool, E>>,
{
  if !dependents.is_empty() {
    return Ok(DeleteOutcome::Blocked(dependents));
  }
  Ok(if delete().await? { DeleteOutcome::Deleted } else { DeleteOutcome::NotFound })
}

/// Delete an author unless books still reference it.
pub async fn delete_author<S: CatalogStore>(
  store: &S,
  id: AuthorId,
) -> Result<DeleteOutcome<BookSummary>, S::Error> {
  let books = store.author_books(id).await?;
  guarded(books, || store.delete_author(id)).await
}

/// Delete a book unless copies of it still exist.
pub async fn delete_book<S: CatalogStore>(
  store: &S,
  id: BookId,
) -> Result<DeleteOutcome<BookInstance>, S::Error> {
  let copies = store.book_instances(id).await?;
  guarded(copies, || store.delete_book(id)).await
}

/// Delete a genre. Genres are not guarded: the books filed under it simply
/// lose it from their genre sets.
pub async fn delete_genre<S: CatalogStore>(
  store: &S,
  id: GenreId,
) -> Result<DeleteOutcome<Infallible>, S::Error> {
  guarded(Vec::new(), || store.delete_genre(id)).await
}

/// Delete a copy. Nothing depends on copies.
pub async fn delete_book_instance<S: CatalogStore>(
  store: &S,
  id: BookInstanceId,
) -> Result<DeleteOutcome<Infallible>, S::Error> {
  guarded(Vec::new(), || store.delete_book_instance(id)).await
}

// ─── Write-time references ───────────────────────────────────────────────────

/// Violations for a book whose author or genres do not exist.
pub async fn book_references<S: CatalogStore>(
  store: &S,
  input: &NewBook,
) -> Result<Vec<Violation>, S::Error> {
  let mut violations = Vec::new();

  if store.get_author(input.author).await?.is_none() {
    violations.push(Violation::new("author", AUTHOR_MISSING));
  }

  if !input.genre.is_empty() {
    let known = store.list_genres().await?;
    if input.genre.iter().any(|id| !known.iter().any(|g| g.id == *id)) {
      violations.push(Violation::new("genre", GENRE_MISSING));
    }
  }

  Ok(violations)
}

/// Violations for a copy whose book does not exist.
pub async fn book_instance_references<S: CatalogStore>(
  store: &S,
  input: &NewBookInstance,
) -> Result<Vec<Violation>, S::Error> {
  Ok(match store.get_book(input.book).await? {
    Some(_) => Vec::new(),
    None => vec![Violation::new("book", BOOK_MISSING)],
  })
}
