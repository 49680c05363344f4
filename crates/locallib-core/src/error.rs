//! Error types for `locallib-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed id {0:?}: {1}")]
  InvalidId(String, #[source] uuid::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
