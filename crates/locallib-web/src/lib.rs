//! HTTP layer for the local library catalog.
//!
//! Exposes an axum [`Router`] serving the catalog pages, backed by any
//! [`CatalogStore`]. Pages are rendered as JSON view documents; see
//! [`view`].

pub mod error;
pub mod handlers;
pub mod view;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use locallib_core::store::CatalogStore;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use handlers::{author, book, book_instance, genre, index};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LOCALLIB_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 3000,
      store_path:           PathBuf::from("locallib.db"),
      request_timeout_secs: 30,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CatalogStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the catalog.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CatalogStore + Clone + Send + Sync + 'static,
{
  let timeout = Duration::from_secs(state.config.request_timeout_secs);

  Router::new()
    .route("/",                                   get(index::root))
    .route("/catalog",                            get(index::home::<S>))
    .route("/catalog/",                           get(index::home::<S>))
    // Authors
    .route("/catalog/authors",                    get(author::list::<S>))
    .route("/catalog/author/create",              get(author::create_form).post(author::create::<S>))
    .route("/catalog/author/{id}",                get(author::detail::<S>))
    .route("/catalog/author/{id}/delete",         get(author::delete_form::<S>).post(author::delete::<S>))
    .route("/catalog/author/{id}/update",         get(author::update_form::<S>).post(author::update::<S>))
    // Genres
    .route("/catalog/genres",                     get(genre::list::<S>))
    .route("/catalog/genre/create",               get(genre::create_form).post(genre::create::<S>))
    .route("/catalog/genre/{id}",                 get(genre::detail::<S>))
    .route("/catalog/genre/{id}/delete",          get(genre::delete_form::<S>).post(genre::delete::<S>))
    .route("/catalog/genre/{id}/update",          get(genre::update_form::<S>).post(genre::update::<S>))
    // Books
    .route("/catalog/books",                      get(book::list::<S>))
    .route("/catalog/book/create",                get(book::create_form::<S>).post(book::create::<S>))
    .route("/catalog/book/{id}",                  get(book::detail::<S>))
    .route("/catalog/book/{id}/delete",           get(book::delete_form::<S>).post(book::delete::<S>))
    .route("/catalog/book/{id}/update",           get(book::update_form::<S>).post(book::update::<S>))
    // Copies
    .route("/catalog/bookinstances",              get(book_instance::list::<S>))
    .route(
      "/catalog/bookinstance/create",
      get(book_instance::create_form::<S>).post(book_instance::create::<S>),
    )
    .route("/catalog/bookinstance/{id}",          get(book_instance::detail::<S>))
    .route(
      "/catalog/bookinstance/{id}/delete",
      get(book_instance::delete_form::<S>).post(book_instance::delete::<S>),
    )
    .route(
      "/catalog/bookinstance/{id}/update",
      get(book_instance::update_form::<S>).post(book_instance::update::<S>),
    )
    .layer(TimeoutLayer::new(timeout))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
