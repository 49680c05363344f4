//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _};

use locallib_core::{
  AuthorId, BookId, BookInstanceId, GenreId,
  author::{Author, NewAuthor},
  book::{Book, BookDetail, BookListing, BookSummary, NewBook},
  book_instance::{BookInstance, BookInstanceDetail, BookInstanceStatus, NewBookInstance},
  genre::{Genre, NewGenre},
  store::CatalogStore,
};

use crate::{
  Result,
  encode::{
    GenreLinks, RawAuthor, RawBook, RawBookInstance, RawBookSummary, RawGenre,
    encode_date, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Connection-level helpers ────────────────────────────────────────────────
//
// These run inside `tokio_rusqlite::Connection::call` closures, on the
// database thread.

fn genre_links_for(conn: &Connection, book_id: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt =
    conn.prepare("SELECT genre_id FROM book_genres WHERE book_id = ?1 ORDER BY genre_id")?;
  stmt
    .query_map(rusqlite::params![book_id], |row| row.get(0))?
    .collect()
}

fn all_genre_links(conn: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
  let mut stmt =
    conn.prepare("SELECT book_id, genre_id FROM book_genres ORDER BY book_id, genre_id")?;
  stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect()
}

fn insert_genre_links(
  conn: &Connection,
  book_id: &str,
  genre_ids: &[String],
) -> rusqlite::Result<()> {
  let mut stmt =
    conn.prepare("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?1, ?2)")?;
  for genre_id in genre_ids {
    stmt.execute(rusqlite::params![book_id, genre_id])?;
  }
  Ok(())
}

fn count(conn: &Connection, sql: &str) -> rusqlite::Result<u64> {
  let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
  Ok(u64::try_from(n).unwrap_or_default())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A LocalLib catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str) -> Result<u64> {
    Ok(self.conn.call(move |conn| Ok(count(conn, sql)?)).await?)
  }

  /// Run a single-row `DELETE` and report whether a row went away.
  async fn delete_one(&self, sql: &'static str, id: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id])?))
      .await?;
    Ok(changed > 0)
  }

  async fn book_summaries(&self, sql: &'static str, id: String) -> Result<Vec<BookSummary>> {
    let raws: Vec<RawBookSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id], RawBookSummary::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBookSummary::into_summary).collect()
  }

  /// Write the author columns of `input` under `id`. With `insert == false`
  /// the row must already exist; returns whether a row was written.
  async fn write_author(&self, id: AuthorId, input: &NewAuthor, insert: bool) -> Result<bool> {
    let id_str      = encode_uuid(id.as_uuid());
    let first_name  = input.first_name.clone();
    let family_name = input.family_name.clone();
    let birth_str   = input.date_of_birth.map(encode_date);
    let death_str   = input.date_of_death.map(encode_date);

    let sql = if insert {
      "INSERT INTO authors (author_id, first_name, family_name, date_of_birth, date_of_death)
       VALUES (?1, ?2, ?3, ?4, ?5)"
    } else {
      "UPDATE authors
       SET first_name = ?2, family_name = ?3, date_of_birth = ?4, date_of_death = ?5
       WHERE author_id = ?1"
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![id_str, first_name, family_name, birth_str, death_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn write_genre(&self, id: GenreId, input: &NewGenre, insert: bool) -> Result<bool> {
    let id_str = encode_uuid(id.as_uuid());
    let name   = input.name.clone();

    let sql = if insert {
      "INSERT INTO genres (genre_id, name) VALUES (?1, ?2)"
    } else {
      "UPDATE genres SET name = ?2 WHERE genre_id = ?1"
    };

    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str, name])?))
      .await?;
    Ok(changed > 0)
  }

  /// Write a book row and replace its genre links in one transaction.
  async fn write_book(&self, id: BookId, input: &NewBook, insert: bool) -> Result<bool> {
    let id_str     = encode_uuid(id.as_uuid());
    let title      = input.title.clone();
    let summary    = input.summary.clone();
    let isbn       = input.isbn.clone();
    let author_str = encode_uuid(input.author.as_uuid());
    let genre_strs: Vec<String> =
      input.genre.iter().map(|g| encode_uuid(g.as_uuid())).collect();

    let sql = if insert {
      "INSERT INTO books (book_id, title, summary, isbn, author_id)
       VALUES (?1, ?2, ?3, ?4, ?5)"
    } else {
      "UPDATE books SET title = ?2, summary = ?3, isbn = ?4, author_id = ?5
       WHERE book_id = ?1"
    };

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          sql,
          rusqlite::params![id_str, title, summary, isbn, author_str],
        )?;
        if changed == 0 {
          return Ok(false);
        }
        tx.execute("DELETE FROM book_genres WHERE book_id = ?1", rusqlite::params![id_str])?;
        insert_genre_links(&tx, &id_str, &genre_strs)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(written)
  }

  async fn write_book_instance(
    &self,
    id: BookInstanceId,
    input: &NewBookInstance,
    insert: bool,
  ) -> Result<bool> {
    let id_str       = encode_uuid(id.as_uuid());
    let book_str     = encode_uuid(input.book.as_uuid());
    let imprint      = input.imprint.clone();
    let status_str   = encode_status(input.status);
    let due_back_str = input.due_back.map(encode_date);

    let sql = if insert {
      "INSERT INTO book_instances (book_instance_id, book_id, imprint, status, due_back)
       VALUES (?1, ?2, ?3, ?4, ?5)"
    } else {
      "UPDATE book_instances SET book_id = ?2, imprint = ?3, status = ?4, due_back = ?5
       WHERE book_instance_id = ?1"
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![id_str, book_str, imprint, status_str, due_back_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = crate::Error;

  // ── Authors ───────────────────────────────────────────────────────────────

  async fn list_authors(&self) -> Result<Vec<Author>> {
    let raws: Vec<RawAuthor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM authors a ORDER BY a.family_name, a.first_name, a.author_id",
          RawAuthor::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| RawAuthor::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuthor::into_author).collect()
  }

  async fn get_author(&self, id: AuthorId) -> Result<Option<Author>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<RawAuthor> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM authors a WHERE a.author_id = ?1", RawAuthor::COLUMNS),
            rusqlite::params![id_str],
            |row| RawAuthor::read(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAuthor::into_author).transpose()
  }

  async fn author_books(&self, id: AuthorId) -> Result<Vec<BookSummary>> {
    self
      .book_summaries(
        "SELECT book_id, title, summary FROM books
         WHERE author_id = ?1
         ORDER BY title, book_id",
        encode_uuid(id.as_uuid()),
      )
      .await
  }

  async fn create_author(&self, input: NewAuthor) -> Result<Author> {
    let id = AuthorId::new();
    self.write_author(id, &input, true).await?;
    Ok(input.into_author(id))
  }

  async fn update_author(&self, id: AuthorId, input: NewAuthor) -> Result<Option<Author>> {
    let written = self.write_author(id, &input, false).await?;
    Ok(written.then(|| input.into_author(id)))
  }

  async fn delete_author(&self, id: AuthorId) -> Result<bool> {
    self
      .delete_one("DELETE FROM authors WHERE author_id = ?1", encode_uuid(id.as_uuid()))
      .await
  }

  async fn count_authors(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM authors").await
  }

  // ── Genres ────────────────────────────────────────────────────────────────

  async fn list_genres(&self) -> Result<Vec<Genre>> {
    let raws: Vec<RawGenre> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM genres g ORDER BY g.name, g.genre_id",
          RawGenre::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| RawGenre::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGenre::into_genre).collect()
  }

  async fn get_genre(&self, id: GenreId) -> Result<Option<Genre>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<RawGenre> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM genres g WHERE g.genre_id = ?1", RawGenre::COLUMNS),
            rusqlite::params![id_str],
            |row| RawGenre::read(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGenre::into_genre).transpose()
  }

  async fn find_genre_by_name<'a>(&'a self, name: &'a str) -> Result<Option<Genre>> {
    let name = name.to_owned();

    let raw: Option<RawGenre> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM genres g WHERE g.name = ?1 COLLATE NOCASE
               ORDER BY g.genre_id LIMIT 1",
              RawGenre::COLUMNS
            ),
            rusqlite::params![name],
            |row| RawGenre::read(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawGenre::into_genre).transpose()
  }

  async fn genre_books(&self, id: GenreId) -> Result<Vec<BookSummary>> {
    self
      .book_summaries(
        "SELECT b.book_id, b.title, b.summary FROM books b
         JOIN book_genres bg ON bg.book_id = b.book_id
         WHERE bg.genre_id = ?1
         ORDER BY b.title, b.book_id",
        encode_uuid(id.as_uuid()),
      )
      .await
  }

  async fn create_genre(&self, input: NewGenre) -> Result<Genre> {
    let id = GenreId::new();
    self.write_genre(id, &input, true).await?;
    Ok(Genre { id, name: input.name })
  }

  async fn update_genre(&self, id: GenreId, input: NewGenre) -> Result<Option<Genre>> {
    let written = self.write_genre(id, &input, false).await?;
    Ok(written.then(|| Genre { id, name: input.name }))
  }

  async fn delete_genre(&self, id: GenreId) -> Result<bool> {
    self
      .delete_one("DELETE FROM genres WHERE genre_id = ?1", encode_uuid(id.as_uuid()))
      .await
  }

  async fn count_genres(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM genres").await
  }

  // ── Books ─────────────────────────────────────────────────────────────────

  async fn list_books(&self) -> Result<Vec<Book>> {
    let (raws, links): (Vec<RawBook>, Vec<(String, String)>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM books b ORDER BY b.title, b.book_id",
          RawBook::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| RawBook::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, all_genre_links(conn)?))
      })
      .await?;

    let mut links = GenreLinks::from_rows(links);
    raws
      .into_iter()
      .map(|raw| {
        let genres = links.take(&raw.book_id);
        raw.into_book(genres)
      })
      .collect()
  }

  async fn list_book_listings(&self) -> Result<Vec<BookListing>> {
    let (raws, links): (Vec<(RawBook, RawAuthor)>, Vec<(String, String)>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, {} FROM books b
           JOIN authors a ON a.author_id = b.author_id
           ORDER BY b.title, b.book_id",
          RawBook::COLUMNS,
          RawAuthor::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| Ok((RawBook::read(row, 0)?, RawAuthor::read(row, 5)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, all_genre_links(conn)?))
      })
      .await?;

    let mut links = GenreLinks::from_rows(links);
    raws
      .into_iter()
      .map(|(raw_book, raw_author)| {
        let genres = links.take(&raw_book.book_id);
        Ok(BookListing {
          book:   raw_book.into_book(genres)?,
          author: raw_author.into_author()?,
        })
      })
      .collect()
  }

  async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<(RawBook, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let book = conn
          .query_row(
            &format!("SELECT {} FROM books b WHERE b.book_id = ?1", RawBook::COLUMNS),
            rusqlite::params![id_str],
            |row| RawBook::read(row, 0),
          )
          .optional()?;
        match book {
          Some(book) => {
            let genres = genre_links_for(conn, &id_str)?;
            Ok(Some((book, genres)))
          }
          None => Ok(None),
        }
      })
      .await?;

    raw.map(|(book, genres)| book.into_book(genres)).transpose()
  }

  async fn get_book_detail(&self, id: BookId) -> Result<Option<BookDetail>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<(RawBook, RawAuthor, Vec<RawGenre>)> = self
      .conn
      .call(move |conn| {
        let head = conn
          .query_row(
            &format!(
              "SELECT {}, {} FROM books b
               JOIN authors a ON a.author_id = b.author_id
               WHERE b.book_id = ?1",
              RawBook::COLUMNS,
              RawAuthor::COLUMNS
            ),
            rusqlite::params![id_str],
            |row| Ok((RawBook::read(row, 0)?, RawAuthor::read(row, 5)?)),
          )
          .optional()?;
        let Some((book, author)) = head else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM genres g
           JOIN book_genres bg ON bg.genre_id = g.genre_id
           WHERE bg.book_id = ?1
           ORDER BY g.name, g.genre_id",
          RawGenre::COLUMNS
        ))?;
        let genres = stmt
          .query_map(rusqlite::params![id_str], |row| RawGenre::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some((book, author, genres)))
      })
      .await?;

    let Some((raw_book, raw_author, raw_genres)) = raw else {
      return Ok(None);
    };

    let genres: Vec<Genre> =
      raw_genres.into_iter().map(RawGenre::into_genre).collect::<Result<_>>()?;
    let genre_ids = genres.iter().map(|g| encode_uuid(g.id.as_uuid())).collect();

    Ok(Some(BookDetail {
      book: raw_book.into_book(genre_ids)?,
      author: raw_author.into_author()?,
      genres,
    }))
  }

  async fn book_instances(&self, id: BookId) -> Result<Vec<BookInstance>> {
    let id_str = encode_uuid(id.as_uuid());

    let raws: Vec<RawBookInstance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM book_instances bi
           WHERE bi.book_id = ?1
           ORDER BY bi.imprint, bi.book_instance_id",
          RawBookInstance::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| RawBookInstance::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBookInstance::into_instance).collect()
  }

  async fn create_book(&self, input: NewBook) -> Result<Book> {
    let id = BookId::new();
    self.write_book(id, &input, true).await?;
    Ok(input.into_book(id))
  }

  async fn update_book(&self, id: BookId, input: NewBook) -> Result<Option<Book>> {
    let written = self.write_book(id, &input, false).await?;
    Ok(written.then(|| input.into_book(id)))
  }

  async fn delete_book(&self, id: BookId) -> Result<bool> {
    self
      .delete_one("DELETE FROM books WHERE book_id = ?1", encode_uuid(id.as_uuid()))
      .await
  }

  async fn count_books(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM books").await
  }

  // ── Book instances ────────────────────────────────────────────────────────

  async fn list_book_instances(&self) -> Result<Vec<BookInstanceDetail>> {
    let (raws, links): (Vec<(RawBookInstance, RawBook)>, Vec<(String, String)>) = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {}, {} FROM book_instances bi
           JOIN books b ON b.book_id = bi.book_id
           ORDER BY b.title, bi.imprint, bi.book_instance_id",
          RawBookInstance::COLUMNS,
          RawBook::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok((RawBookInstance::read(row, 0)?, RawBook::read(row, 5)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, all_genre_links(conn)?))
      })
      .await?;

    let links = GenreLinks::from_rows(links);
    raws
      .into_iter()
      .map(|(raw_instance, raw_book)| {
        // Several copies share a book, so links are cloned rather than taken.
        let genres = links.get(&raw_book.book_id);
        Ok(BookInstanceDetail {
          instance: raw_instance.into_instance()?,
          book:     raw_book.into_book(genres)?,
        })
      })
      .collect()
  }

  async fn get_book_instance(&self, id: BookInstanceId) -> Result<Option<BookInstance>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<RawBookInstance> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {} FROM book_instances bi WHERE bi.book_instance_id = ?1",
              RawBookInstance::COLUMNS
            ),
            rusqlite::params![id_str],
            |row| RawBookInstance::read(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBookInstance::into_instance).transpose()
  }

  async fn get_book_instance_detail(
    &self,
    id: BookInstanceId,
  ) -> Result<Option<BookInstanceDetail>> {
    let id_str = encode_uuid(id.as_uuid());

    let raw: Option<(RawBookInstance, RawBook, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            &format!(
              "SELECT {}, {} FROM book_instances bi
               JOIN books b ON b.book_id = bi.book_id
               WHERE bi.book_instance_id = ?1",
              RawBookInstance::COLUMNS,
              RawBook::COLUMNS
            ),
            rusqlite::params![id_str],
            |row| Ok((RawBookInstance::read(row, 0)?, RawBook::read(row, 5)?)),
          )
          .optional()?;
        match row {
          Some((instance, book)) => {
            let genres = genre_links_for(conn, &book.book_id)?;
            Ok(Some((instance, book, genres)))
          }
          None => Ok(None),
        }
      })
      .await?;

    raw
      .map(|(instance, book, genres)| {
        Ok(BookInstanceDetail {
          instance: instance.into_instance()?,
          book:     book.into_book(genres)?,
        })
      })
      .transpose()
  }

  async fn create_book_instance(&self, input: NewBookInstance) -> Result<BookInstance> {
    let id = BookInstanceId::new();
    self.write_book_instance(id, &input, true).await?;
    Ok(input.into_instance(id))
  }

  async fn update_book_instance(
    &self,
    id: BookInstanceId,
    input: NewBookInstance,
  ) -> Result<Option<BookInstance>> {
    let written = self.write_book_instance(id, &input, false).await?;
    Ok(written.then(|| input.into_instance(id)))
  }

  async fn delete_book_instance(&self, id: BookInstanceId) -> Result<bool> {
    self
      .delete_one(
        "DELETE FROM book_instances WHERE book_instance_id = ?1",
        encode_uuid(id.as_uuid()),
      )
      .await
  }

  async fn count_book_instances(&self) -> Result<u64> {
    self.count("SELECT COUNT(*) FROM book_instances").await
  }

  async fn count_available_book_instances(&self) -> Result<u64> {
    let available = encode_status(BookInstanceStatus::Available);
    let n = self
      .conn
      .call(move |conn| {
        let n: i64 = conn.query_row(
          "SELECT COUNT(*) FROM book_instances WHERE status = ?1",
          rusqlite::params![available],
          |row| row.get(0),
        )?;
        Ok(n)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }
}
