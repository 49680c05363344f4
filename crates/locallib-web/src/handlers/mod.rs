//! Catalog controllers, one module per entity.
//!
//! Every controller follows the same shape: parse the path identity, run
//! the reads it needs (concurrently when independent), and hand the results
//! to the view layer as a [`Page`](crate::view::Page).

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod index;

use std::str::FromStr;

use crate::error::Error;

/// Parse a path identity. Anything that is not a well-formed id cannot name
/// an existing entity, so it is reported as not found.
fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, Error> {
  raw.parse().map_err(|_| Error::NotFound(format!("{what} {raw}")))
}
