//! Core types and trait definitions for the LocalLib catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store backend and the web layer both depend on it.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod error;
pub mod form;
pub mod genre;
pub mod guard;
pub mod id;
pub mod store;
pub mod validate;

mod date;

pub use error::{Error, Result};
pub use id::{AuthorId, BookId, BookInstanceId, GenreId};
