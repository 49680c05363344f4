//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::view::Page;

const STORE_FAILURE_MESSAGE: &str = "The catalog is unavailable right now.";

#[derive(Debug, Error)]
pub enum Error {
  /// A single-entity read did not resolve. Lists never produce this.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, title, message) = match self {
      Error::NotFound(what) => (StatusCode::NOT_FOUND, "Not Found", format!("{what} not found")),
      // Backend detail stays in the log.
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "Error", STORE_FAILURE_MESSAGE.to_string())
      }
    };
    let page = Page::render("error", title, serde_json::json!({ "message": message }));
    (status, page).into_response()
  }
}
