//! Handlers for book-copy pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/bookinstances` | Every copy with its book |
//! | `GET`  | `/catalog/bookinstance/create` | Form with book and status choices |
//! | `POST` | `/catalog/bookinstance/create` | Book must exist |
//! | `GET`  | `/catalog/bookinstance/{id}` | 404 if not found |
//! | `GET`  | `/catalog/bookinstance/{id}/delete` | Confirmation page |
//! | `POST` | `/catalog/bookinstance/{id}/delete` | Never blocked |
//! | `GET`  | `/catalog/bookinstance/{id}/update` | Pre-filled form |
//! | `POST` | `/catalog/bookinstance/{id}/update` | Redirects to the copy |

use axum::{
  Form,
  extract::{Path, State},
};
use locallib_core::{
  BookInstanceId,
  book_instance::NewBookInstance,
  form::{BookInstanceForm, FormData},
  guard,
  store::CatalogStore,
  validate::{self, Violation},
};
use serde_json::json;

use super::parse_id;
use crate::{AppState, error::Error, view::{self, Page}};

const LIST_URL: &str = "/catalog/bookinstances";

async fn form_page<S>(
  store: &S,
  title: &str,
  form: &BookInstanceForm,
  errors: &[Violation],
) -> Result<Page, Error>
where
  S: CatalogStore,
{
  let books = store.list_books().await.map_err(Error::store)?;
  Ok(Page::render("bookinstance_form", title, json!({
    "bookinstance": form,
    "books":        view::book_choices(&books, form),
    "statuses":     view::status_choices(form),
    "errors":       view::errors(errors),
  })))
}

async fn checked_input<S>(
  store: &S,
  form: &BookInstanceForm,
) -> Result<Result<NewBookInstance, Vec<Violation>>, Error>
where
  S: CatalogStore,
{
  let input = match validate::book_instance(form) {
    Ok(input) => input,
    Err(errors) => return Ok(Err(errors)),
  };
  let missing = guard::book_instance_references(store, &input).await.map_err(Error::store)?;
  Ok(if missing.is_empty() { Ok(input) } else { Err(missing) })
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /catalog/bookinstances`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let copies = state.store.list_book_instances().await.map_err(Error::store)?;
  Ok(Page::render("bookinstance_list", "Book Instance List", json!({
    "bookinstance_list": view::list(&copies, view::book_instance_detail),
  })))
}

/// `GET /catalog/bookinstance/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookInstanceId = parse_id(&id, "book copy")?;
  let copy = state
    .store
    .get_book_instance_detail(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("book copy {id}")))?;

  Ok(Page::render("bookinstance_detail", format!("Book: {}", copy.book.title), json!({
    "bookinstance": view::book_instance_detail(&copy),
  })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `GET /catalog/bookinstance/create`
pub async fn create_form<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  form_page(state.store.as_ref(), "Create BookInstance", &BookInstanceForm::default(), &[]).await
}

/// `POST /catalog/bookinstance/create`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  let form = BookInstanceForm::from_input(&FormData::new(pairs), None);
  let input = match checked_input(store, &form).await? {
    Ok(input) => input,
    Err(errors) => return form_page(store, "Create BookInstance", &form, &errors).await,
  };

  let copy = store.create_book_instance(input).await.map_err(Error::store)?;
  tracing::info!(book_instance_id = %copy.id, book_id = %copy.book, "created book copy");
  Ok(Page::redirect(copy.url()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /catalog/bookinstance/{id}/delete`
pub async fn delete_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<BookInstanceId>() else {
    return Ok(Page::redirect(LIST_URL));
  };
  let copy = state.store.get_book_instance_detail(id).await.map_err(Error::store)?;

  Ok(match copy {
    Some(copy) => Page::render("bookinstance_delete", "Delete BookInstance", json!({
      "bookinstance": view::book_instance_detail(&copy),
    })),
    None => Page::redirect(LIST_URL),
  })
}

/// `POST /catalog/bookinstance/{id}/delete`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if let Ok(id) = id.parse::<BookInstanceId>() {
    let outcome =
      guard::delete_book_instance(state.store.as_ref(), id).await.map_err(Error::store)?;
    tracing::info!(book_instance_id = %id, ?outcome, "book copy delete");
  }
  Ok(Page::redirect(LIST_URL))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `GET /catalog/bookinstance/{id}/update`
pub async fn update_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookInstanceId = parse_id(&id, "book copy")?;
  let copy = state
    .store
    .get_book_instance(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("book copy {id}")))?;

  let form = BookInstanceForm::from_instance(&copy);
  form_page(state.store.as_ref(), "Update BookInstance", &form, &[]).await
}

/// `POST /catalog/bookinstance/{id}/update`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: BookInstanceId = parse_id(&id, "book copy")?;
  let store = state.store.as_ref();
  let form = BookInstanceForm::from_input(&FormData::new(pairs), Some(id));
  let input = match checked_input(store, &form).await? {
    Ok(input) => input,
    Err(errors) => return form_page(store, "Update BookInstance", &form, &errors).await,
  };

  let copy = store
    .update_book_instance(id, input)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("book copy {id}")))?;
  tracing::info!(book_instance_id = %id, "updated book copy");
  Ok(Page::redirect(copy.url()))
}
