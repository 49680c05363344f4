//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `locallib-store-sqlite`).
//! The web layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  author::{Author, NewAuthor},
  book::{Book, BookDetail, BookListing, BookSummary, NewBook},
  book_instance::{BookInstance, BookInstanceDetail, NewBookInstance},
  genre::{Genre, NewGenre},
  id::{AuthorId, BookId, BookInstanceId, GenreId},
};

/// Abstraction over a catalog store backend.
///
/// Single-entity reads return `None` when the identity does not resolve;
/// list reads return an empty `Vec` instead. `update_*` returns `None` and
/// `delete_*` returns `false` for unknown identities.
///
/// `delete_*` performs no dependency check. Callers go through
/// [`crate::guard`], which refuses to delete entities that still have
/// dependents.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Authors ───────────────────────────────────────────────────────────

  /// All authors, ordered by family name, then first name.
  fn list_authors(
    &self,
  ) -> impl Future<Output = Result<Vec<Author>, Self::Error>> + Send + '_;

  fn get_author(
    &self,
    id: AuthorId,
  ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send + '_;

  /// Books written by the author, ordered by title.
  fn author_books(
    &self,
    id: AuthorId,
  ) -> impl Future<Output = Result<Vec<BookSummary>, Self::Error>> + Send + '_;

  /// Persist a new author under a freshly assigned identity.
  fn create_author(
    &self,
    input: NewAuthor,
  ) -> impl Future<Output = Result<Author, Self::Error>> + Send + '_;

  /// Replace every mutable field; the identity is preserved.
  fn update_author(
    &self,
    id: AuthorId,
    input: NewAuthor,
  ) -> impl Future<Output = Result<Option<Author>, Self::Error>> + Send + '_;

  fn delete_author(
    &self,
    id: AuthorId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_authors(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Genres ────────────────────────────────────────────────────────────

  /// All genres, ordered by name.
  fn list_genres(&self) -> impl Future<Output = Result<Vec<Genre>, Self::Error>> + Send + '_;

  fn get_genre(
    &self,
    id: GenreId,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + '_;

  /// Case-insensitive exact match on the genre name.
  fn find_genre_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + 'a;

  /// Books filed under the genre, ordered by title.
  fn genre_books(
    &self,
    id: GenreId,
  ) -> impl Future<Output = Result<Vec<BookSummary>, Self::Error>> + Send + '_;

  fn create_genre(
    &self,
    input: NewGenre,
  ) -> impl Future<Output = Result<Genre, Self::Error>> + Send + '_;

  fn update_genre(
    &self,
    id: GenreId,
    input: NewGenre,
  ) -> impl Future<Output = Result<Option<Genre>, Self::Error>> + Send + '_;

  /// Deleting a genre also removes it from every book's genre set.
  fn delete_genre(
    &self,
    id: GenreId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_genres(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Books ─────────────────────────────────────────────────────────────

  /// All books, ordered by title.
  fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;

  /// All books with their authors resolved, ordered by title.
  fn list_book_listings(
    &self,
  ) -> impl Future<Output = Result<Vec<BookListing>, Self::Error>> + Send + '_;

  fn get_book(
    &self,
    id: BookId,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  /// The book with its author and genres resolved.
  fn get_book_detail(
    &self,
    id: BookId,
  ) -> impl Future<Output = Result<Option<BookDetail>, Self::Error>> + Send + '_;

  /// Copies of the book, ordered by imprint.
  fn book_instances(
    &self,
    id: BookId,
  ) -> impl Future<Output = Result<Vec<BookInstance>, Self::Error>> + Send + '_;

  fn create_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<Book, Self::Error>> + Send + '_;

  /// Replace every mutable field, the genre set included.
  fn update_book(
    &self,
    id: BookId,
    input: NewBook,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  fn delete_book(
    &self,
    id: BookId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_books(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Book instances ────────────────────────────────────────────────────

  /// All copies with their books resolved, ordered by book title, then
  /// imprint.
  fn list_book_instances(
    &self,
  ) -> impl Future<Output = Result<Vec<BookInstanceDetail>, Self::Error>> + Send + '_;

  fn get_book_instance(
    &self,
    id: BookInstanceId,
  ) -> impl Future<Output = Result<Option<BookInstance>, Self::Error>> + Send + '_;

  /// The copy with its book resolved.
  fn get_book_instance_detail(
    &self,
    id: BookInstanceId,
  ) -> impl Future<Output = Result<Option<BookInstanceDetail>, Self::Error>> + Send + '_;

  fn create_book_instance(
    &self,
    input: NewBookInstance,
  ) -> impl Future<Output = Result<BookInstance, Self::Error>> + Send + '_;

  fn update_book_instance(
    &self,
    id: BookInstanceId,
    input: NewBookInstance,
  ) -> impl Future<Output = Result<Option<BookInstance>, Self::Error>> + Send + '_;

  fn delete_book_instance(
    &self,
    id: BookInstanceId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_book_instances(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Copies whose status is `Available`.
  fn count_available_book_instances(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
