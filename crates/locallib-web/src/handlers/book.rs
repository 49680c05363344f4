//! Handlers for book pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/books` | Title and author, sorted by title |
//! | `GET`  | `/catalog/book/create` | Form with author and genre choices |
//! | `POST` | `/catalog/book/create` | Author and genres must exist |
//! | `GET`  | `/catalog/book/{id}` | Book, author, genres and copies |
//! | `GET`  | `/catalog/book/{id}/delete` | Book and its copies |
//! | `POST` | `/catalog/book/{id}/delete` | Blocked while copies remain |
//! | `GET`  | `/catalog/book/{id}/update` | Pre-filled form |
//! | `POST` | `/catalog/book/{id}/update` | Replaces the genre set |

use axum::{
  Form,
  extract::{Path, State},
};
use locallib_core::{
  BookId,
  book::{BookDetail, NewBook},
  book_instance::BookInstance,
  form::{BookForm, FormData},
  guard::{self, DeleteOutcome},
  store::CatalogStore,
  validate::{self, Violation},
};
use serde_json::json;

use super::parse_id;
use crate::{AppState, error::Error, view::{self, Page}};

const LIST_URL: &str = "/catalog/books";

/// Render the book form with every author and genre offered, the submitted
/// ones pre-selected.
async fn form_page<S>(
  store: &S,
  title: &str,
  form: &BookForm,
  errors: &[Violation],
) -> Result<Page, Error>
where
  S: CatalogStore,
{
  let (authors, genres) =
    tokio::try_join!(store.list_authors(), store.list_genres()).map_err(Error::store)?;

  Ok(Page::render("book_form", title, json!({
    "book":    form,
    "authors": view::author_choices(&authors, form),
    "genres":  view::genre_choices(&genres, form),
    "errors":  view::errors(errors),
  })))
}

fn delete_page(book: &BookDetail, copies: &[BookInstance]) -> Page {
  Page::render("book_delete", "Delete Book", json!({
    "book":           view::book_detail(book),
    "book_instances": view::list(copies, view::book_instance),
  }))
}

/// Field rules first, then the references they name.
async fn checked_input<S>(
  store: &S,
  form: &BookForm,
) -> Result<Result<NewBook, Vec<Violation>>, Error>
where
  S: CatalogStore,
{
  let input = match validate::book(form) {
    Ok(input) => input,
    Err(errors) => return Ok(Err(errors)),
  };
  let missing = guard::book_references(store, &input).await.map_err(Error::store)?;
  Ok(if missing.is_empty() { Ok(input) } else { Err(missing) })
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /catalog/books`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let books = state.store.list_book_listings().await.map_err(Error::store)?;
  Ok(Page::render("book_list", "Book List", json!({
    "book_list": view::list(&books, view::book_listing),
  })))
}

/// `GET /catalog/book/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookId = parse_id(&id, "book")?;
  let (book, copies) =
    tokio::try_join!(state.store.get_book_detail(id), state.store.book_instances(id))
      .map_err(Error::store)?;
  let book = book.ok_or_else(|| Error::NotFound(format!("book {id}")))?;

  Ok(Page::render("book_detail", book.book.title.clone(), json!({
    "book":           view::book_detail(&book),
    "book_instances": view::list(&copies, view::book_instance),
  })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/create`
pub async fn create_form<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  form_page(state.store.as_ref(), "Create Book", &BookForm::default(), &[]).await
}

/// `POST /catalog/book/create`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  let form = BookForm::from_input(&FormData::new(pairs), None);
  let input = match checked_input(store, &form).await? {
    Ok(input) => input,
    Err(errors) => return form_page(store, "Create Book", &form, &errors).await,
  };

  let book = store.create_book(input).await.map_err(Error::store)?;
  tracing::info!(book_id = %book.id, "created book");
  Ok(Page::redirect(book.url()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/{id}/delete`
pub async fn delete_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<BookId>() else {
    return Ok(Page::redirect(LIST_URL));
  };
  let (book, copies) =
    tokio::try_join!(state.store.get_book_detail(id), state.store.book_instances(id))
      .map_err(Error::store)?;

  Ok(match book {
    Some(book) => delete_page(&book, &copies),
    None => Page::redirect(LIST_URL),
  })
}

/// `POST /catalog/book/{id}/delete`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<BookId>() else {
    return Ok(Page::redirect(LIST_URL));
  };

  match guard::delete_book(state.store.as_ref(), id).await.map_err(Error::store)? {
    DeleteOutcome::Blocked(copies) => {
      tracing::warn!(book_id = %id, copies = copies.len(), "book delete blocked");
      let book = state.store.get_book_detail(id).await.map_err(Error::store)?;
      Ok(match book {
        Some(book) => delete_page(&book, &copies),
        None => Page::redirect(LIST_URL),
      })
    }
    DeleteOutcome::Deleted => {
      tracing::info!(book_id = %id, "deleted book");
      Ok(Page::redirect(LIST_URL))
    }
    DeleteOutcome::NotFound => Ok(Page::redirect(LIST_URL)),
  }
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `GET /catalog/book/{id}/update`
pub async fn update_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookId = parse_id(&id, "book")?;
  let book = state
    .store
    .get_book(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("book {id}")))?;

  form_page(state.store.as_ref(), "Update Book", &BookForm::from_book(&book), &[]).await
}

/// `POST /catalog/book/{id}/update`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookId = parse_id(&id, "book")?;
  let store = state.store.as_ref();
  let form = BookForm::from_input(&FormData::new(pairs), Some(id));
  let input = match checked_input(store, &form).await? {
    Ok(input) => input,
    Err(errors) => return form_page(store, "Update Book", &form, &errors).await,
  };

  let book = store
    .update_book(id, input)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("book {id}")))?;
  tracing::info!(book_id = %id, "updated book");
  Ok(Page::redirect(book.url()))
}
