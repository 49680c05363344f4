//! Handlers for genre pages.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog/genres` | Sorted by name |
//! | `GET`  | `/catalog/genre/create` | Empty form |
//! | `POST` | `/catalog/genre/create` | Existing name redirects to that genre |
//! | `GET`  | `/catalog/genre/{id}` | 404 if not found |
//! | `GET`  | `/catalog/genre/{id}/delete` | Genre and its books |
//! | `POST` | `/catalog/genre/{id}/delete` | Never blocked |
//! | `GET`  | `/catalog/genre/{id}/update` | Pre-filled form |
//! | `POST` | `/catalog/genre/{id}/update` | Redirects to the genre |

use axum::{
  Form,
  extract::{Path, State},
};
use locallib_core::{
  GenreId,
  form::{FormData, GenreForm},
  guard,
  store::CatalogStore,
  validate::{self, Violation},
};
use serde_json::json;

use super::parse_id;
use crate::{AppState, error::Error, view::{self, Page}};

const LIST_URL: &str = "/catalog/genres";

fn form_page(title: &str, form: &GenreForm, errors: &[Violation]) -> Page {
  Page::render("genre_form", title, json!({
    "genre":  form,
    "errors": view::errors(errors),
  }))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /catalog/genres`
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let genres = state.store.list_genres().await.map_err(Error::store)?;
  Ok(Page::render("genre_list", "Genre List", json!({
    "genre_list": view::list(&genres, view::genre),
  })))
}

/// `GET /catalog/genre/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: GenreId = parse_id(&id, "genre")?;
  let (genre, books) = tokio::try_join!(state.store.get_genre(id), state.store.genre_books(id))
    .map_err(Error::store)?;
  let genre = genre.ok_or_else(|| Error::NotFound(format!("genre {id}")))?;

  Ok(Page::render("genre_detail", "Genre Detail", json!({
    "genre":       view::genre(&genre),
    "genre_books": view::list(&books, view::book_summary),
  })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `GET /catalog/genre/create`
pub async fn create_form() -> Page { form_page("Create Genre", &GenreForm::default(), &[]) }

/// `POST /catalog/genre/create`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let form = GenreForm::from_input(&FormData::new(pairs), None);
  let input = match validate::genre(&form) {
    Ok(input) => input,
    Err(errors) => return Ok(form_page("Create Genre", &form, &errors)),
  };

  // Stored names are sanitised the same way, so escaped text compares equal.
  let existing = state.store.find_genre_by_name(&input.name).await.map_err(Error::store)?;
  if let Some(existing) = existing {
    tracing::debug!(genre_id = %existing.id, "genre already exists");
    return Ok(Page::redirect(existing.url()));
  }

  let genre = state.store.create_genre(input).await.map_err(Error::store)?;
  tracing::info!(genre_id = %genre.id, "created genre");
  Ok(Page::redirect(genre.url()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /catalog/genre/{id}/delete`
pub async fn delete_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let Ok(id) = id.parse::<GenreId>() else {
    return Ok(Page::redirect(LIST_URL));
  };
  let (genre, books) = tokio::try_join!(state.store.get_genre(id), state.store.genre_books(id))
    .map_err(Error::store)?;

  Ok(match genre {
    Some(genre) => Page::render("genre_delete", "Delete Genre", json!({
      "genre":       view::genre(&genre),
      "genre_books": view::list(&books, view::book_summary),
    })),
    None => Page::redirect(LIST_URL),
  })
}

/// `POST /catalog/genre/{id}/delete`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  if let Ok(id) = id.parse::<GenreId>() {
    let outcome = guard::delete_genre(state.store.as_ref(), id).await.map_err(Error::store)?;
    tracing::info!(genre_id = %id, ?outcome, "genre delete");
  }
  Ok(Page::redirect(LIST_URL))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `GET /catalog/genre/{id}/update`
pub async fn update_form<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: GenreId = parse_id(&id, "genre")?;
  let genre = state
    .store
    .get_genre(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("genre {id}")))?;

  Ok(form_page("Update Genre", &GenreForm::from_genre(&genre), &[]))
}

/// `POST /catalog/genre/{id}/update`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Page, Error>
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let id: GenreId = parse_id(&id, "genre")?;
  let form = GenreForm::from_input(&FormData::new(pairs), Some(id));
  let input = match validate::genre(&form) {
    Ok(input) => input,
    Err(errors) => return Ok(form_page("Update Genre", &form, &errors)),
  };

  let genre = state
    .store
    .update_genre(id, input)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("genre {id}")))?;
  tracing::info!(genre_id = %id, "updated genre");
  Ok(Page::redirect(genre.url()))
}
