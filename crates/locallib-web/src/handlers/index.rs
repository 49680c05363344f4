//! The catalog home page.

use axum::extract::State;
use locallib_core::store::CatalogStore;
use serde_json::json;

use crate::{AppState, error::Error, view::Page};

/// `GET /`
pub async fn root() -> Page { Page::redirect("/catalog/") }

/// `GET /catalog/`: record counts across the catalog.
pub async fn home<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let store = &state.store;
  let (books, copies, available, authors, genres) = tokio::try_join!(
    store.count_books(),
    store.count_book_instances(),
    store.count_available_book_instances(),
    store.count_authors(),
    store.count_genres(),
  )
  .map_err(Error::store)?;

  Ok(Page::render("index", "Local Library Home", json!({
    "book_count":                    books,
    "book_instance_count":           copies,
    "book_instance_available_count": available,
    "author_count":                  authors,
    "genre_count":                   genres,
  })))
}
