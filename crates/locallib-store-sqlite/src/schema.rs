//! SQL schema for the LocalLib SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS authors (
    author_id     TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    family_name   TEXT NOT NULL,
    date_of_birth TEXT,            -- YYYY-MM-DD or NULL
    date_of_death TEXT             -- YYYY-MM-DD or NULL
);

CREATE TABLE IF NOT EXISTS genres (
    genre_id TEXT PRIMARY KEY,
    name     TEXT NOT NULL
);

-- No ON DELETE action: an author with books cannot be removed.
CREATE TABLE IF NOT EXISTS books (
    book_id   TEXT PRIMARY KEY,
    title     TEXT NOT NULL,
    summary   TEXT NOT NULL,
    isbn      TEXT NOT NULL,
    author_id TEXT NOT NULL REFERENCES authors(author_id)
);

-- A book's genre set. Removing either side removes the link.
CREATE TABLE IF NOT EXISTS book_genres (
    book_id  TEXT NOT NULL REFERENCES books(book_id)   ON DELETE CASCADE,
    genre_id TEXT NOT NULL REFERENCES genres(genre_id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, genre_id)
);

-- No ON DELETE action: a book with copies cannot be removed.
CREATE TABLE IF NOT EXISTS book_instances (
    book_instance_id TEXT PRIMARY KEY,
    book_id          TEXT NOT NULL REFERENCES books(book_id),
    imprint          TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'Maintenance',
    due_back         TEXT             -- YYYY-MM-DD or NULL
);

CREATE INDEX IF NOT EXISTS authors_family_idx      ON authors(family_name);
CREATE INDEX IF NOT EXISTS genres_name_idx         ON genres(name);
CREATE INDEX IF NOT EXISTS books_title_idx         ON books(title);
CREATE INDEX IF NOT EXISTS books_author_idx        ON books(author_id);
CREATE INDEX IF NOT EXISTS book_genres_genre_idx   ON book_genres(genre_id);
CREATE INDEX IF NOT EXISTS book_instances_book_idx ON book_instances(book_id);

PRAGMA user_version = 1;
";
