//! Handlers for author pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/authors` | Sorted by family name |
//! | `GET`  | `/catalog/author/create` | Empty form |
//! | `POST` | `/catalog/author/create` | Redirects to the new author |
//! | `GET`  | `/catalog/author/{id}` | 404 if not found |
//! | `GET`  | `/catalog/author/{id}/delete` | Author and their books |
//! | `POST` | `/catalog/author/{id}/delete` | Blocked while books remain |
//! | `GET`  | `/catalog/author/{id}/update` | Pre-filled form |
//! | `POST` | `/catalog/author/{id}/update` | Redirects to the author |

use axum::{
  Form,
  extract::{Path, State},
};
use locallib_core::{
  AuthorId,
  author::Author,
  book::BookSummary,
  form::{AuthorForm, FormData},
  guard::{self, DeleteOutcome},
  store::CatalogStore,
  validate::{self, Violation},
};
use serde_json::json;

use super::parse_id;
use crate::{AppState, error::Error, view::{self, Page}};

const LIST_URL: &str = "/catalog/authors";

fn form_page(title: &str, form: &AuthorForm, errors: &[Violation]) -> Page {
  Page::render("author_form", title, json!({
    "author": form,
    "errors": view::errors(errors),
  }))
}

fn delete_page(author: &Author, books: &[BookSummary]) -> Page {
  Page::render("author_delete", "Delete Author", json!({
    "author":       view::author(author),
    "author_books": view::list(books, view::book_summary),
  }))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /catalog/authors`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let authors = state.store.list_authors().await.map_err(Error::store)?;
  Ok(Page::render("author_list", "Author List", json!({
    "author_list": view::list(&authors, view::author),
  })))
}

/// `GET /catalog/author/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: AuthorId = parse_id(&id, "author")?;
  let (author, books) = tokio::try_join!(state.store.get_author(id), state.store.author_books(id))
    .map_err(Error::store)?;
  let author = author.ok_or_else(|| Error::NotFound(format!("author {id}")))?;

  Ok(Page::render("author_detail", "Author Detail", json!({
    "author":       view::author(&author),
    "author_books": view::list(&books, view::book_summary),
  })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `GET /catalog/author/create`
pub async fn create_form() -> Page { form_page("Create Author", &AuthorForm::default(), &[]) }

/// `POST /catalog/author/create`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let form = AuthorForm::from_input(&FormData::new(pairs), None);
  let input = match validate::author(&form) {
    Ok(input) => input,
    Err(errors) => return Ok(form_page("Create Author", &form, &errors)),
  };

  let author = state.store.create_author(input).await.map_err(Error::store)?;
  tracing::info!(author_id = %author.id, "created author");
  Ok(Page::redirect(author.url()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /catalog/author/{id}/delete`
pub async fn delete_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<AuthorId>() else {
    return Ok(Page::redirect(LIST_URL));
  };
  let (author, books) = tokio::try_join!(state.store.get_author(id), state.store.author_books(id))
    .map_err(Error::store)?;

  Ok(match author {
    Some(author) => delete_page(&author, &books),
    None => Page::redirect(LIST_URL),
  })
}

/// `POST /catalog/author/{id}/delete`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<AuthorId>() else {
    return Ok(Page::redirect(LIST_URL));
  };

  match guard::delete_author(state.store.as_ref(), id).await.map_err(Error::store)? {
    DeleteOutcome::Blocked(books) => {
      tracing::warn!(author_id = %id, books = books.len(), "author delete blocked");
      let author = state.store.get_author(id).await.map_err(Error::store)?;
      Ok(match author {
        Some(author) => delete_page(&author, &books),
        None => Page::redirect(LIST_URL),
      })
    }
    DeleteOutcome::Deleted => {
      tracing::info!(author_id = %id, "deleted author");
      Ok(Page::redirect(LIST_URL))
    }
    DeleteOutcome::NotFound => Ok(Page::redirect(LIST_URL)),
  }
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `GET /catalog/author/{id}/update`
pub async fn update_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: AuthorId = parse_id(&id, "author")?;
  let author = state
    .store
    .get_author(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("author {id}")))?;

  Ok(form_page("Update Author", &AuthorForm::from_author(&author), &[]))
}

/// `POST /catalog/author/{id}/update`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: AuthorId = parse_id(&id, "author")?;
  let form = AuthorForm::from_input(&FormData::new(pairs), Some(id));
  let input = match validate::author(&form) {
    Ok(input) => input,
    Err(errors) => return Ok(form_page("Update Author", &form, &errors)),
  };

  let author = state
    .store
    .update_author(id, input)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("author {id}")))?;
  tracing::info!(author_id = %id, "updated author");
  Ok(Page::redirect(author.url()))
}
