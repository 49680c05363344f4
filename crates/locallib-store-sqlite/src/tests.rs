//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use locallib_core::{
  AuthorId, BookId, GenreId,
  author::{Author, NewAuthor},
  book::{Book, NewBook},
  book_instance::{BookInstanceStatus, NewBookInstance},
  form::{AuthorForm, FormData},
  genre::{Genre, NewGenre},
  guard::{self, DeleteOutcome},
  store::CatalogStore,
  validate,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_author(first: &str, family: &str) -> NewAuthor {
  NewAuthor {
    first_name:    first.into(),
    family_name:   family.into(),
    date_of_birth: None,
    date_of_death: None,
  }
}

async fn add_author(s: &SqliteStore, first: &str, family: &str) -> Author {
  s.create_author(new_author(first, family)).await.unwrap()
}

async fn add_genre(s: &SqliteStore, name: &str) -> Genre {
  s.create_genre(NewGenre { name: name.into() }).await.unwrap()
}

fn new_book(title: &str, author: AuthorId, genre: Vec<GenreId>) -> NewBook {
  NewBook {
    title: title.into(),
    summary: format!("Summary of {title}"),
    isbn: "9780000000000".into(),
    author,
    genre,
  }
}

async fn add_book(s: &SqliteStore, title: &str, author: AuthorId, genre: Vec<GenreId>) -> Book {
  s.create_book(new_book(title, author, genre)).await.unwrap()
}

fn new_copy(book: BookId, imprint: &str, status: BookInstanceStatus) -> NewBookInstance {
  NewBookInstance { book, imprint: imprint.into(), status, due_back: None }
}

// ─── Authors ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn validated_author_round_trips_sanitised() {
  let s = store().await;

  let input: FormData = [
    ("first_name", "  Jane "),
    ("family_name", "Austen"),
    ("date_of_birth", "1775-12-16"),
    ("date_of_death", ""),
  ]
  .into_iter()
  .collect();
  let fields = validate::author(&AuthorForm::from_input(&input, None)).unwrap();

  let created = s.create_author(fields).await.unwrap();
  let fetched = s.get_author(created.id).await.unwrap().unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.first_name, "Jane");
  assert_eq!(fetched.family_name, "Austen");
  assert_eq!(fetched.date_of_birth, NaiveDate::from_ymd_opt(1775, 12, 16));
  assert_eq!(fetched.date_of_death, None);
}

#[tokio::test]
async fn get_author_missing_returns_none() {
  let s = store().await;
  assert!(s.get_author(AuthorId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_authors_ordered_by_family_name() {
  let s = store().await;
  add_author(&s, "Isaac", "Asimov").await;
  add_author(&s, "Jane", "Austen").await;
  add_author(&s, "Ben", "Bova").await;
  add_author(&s, "Bob", "Billings").await;

  let authors = s.list_authors().await.unwrap();
  let families: Vec<&str> = authors.iter().map(|a| a.family_name.as_str()).collect();
  assert_eq!(families, ["Asimov", "Austen", "Billings", "Bova"]);
  assert!(authors.windows(2).all(|w| w[0].family_name <= w[1].family_name));
}

#[tokio::test]
async fn update_author_preserves_identity() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;

  let mut fields = new_author("Jane", "Austen");
  fields.date_of_death = NaiveDate::from_ymd_opt(1817, 7, 18);
  let updated = s.update_author(author.id, fields).await.unwrap().unwrap();

  assert_eq!(updated.id, author.id);
  let fetched = s.get_author(author.id).await.unwrap().unwrap();
  assert_eq!(fetched.date_of_death, NaiveDate::from_ymd_opt(1817, 7, 18));
  assert_eq!(s.count_authors().await.unwrap(), 1);
}

#[tokio::test]
async fn update_unknown_author_returns_none() {
  let s = store().await;
  let result = s.update_author(AuthorId::new(), new_author("A", "B")).await.unwrap();
  assert!(result.is_none());
  assert_eq!(s.count_authors().await.unwrap(), 0);
}

// ─── Deletion guard ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_author_without_books_succeeds() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;

  let outcome = guard::delete_author(&s, author.id).await.unwrap();
  assert_eq!(outcome, DeleteOutcome::Deleted);
  assert!(s.get_author(author.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_author_with_books_is_blocked() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let book = add_book(&s, "Emma", author.id, vec![]).await;

  let books = match guard::delete_author(&s, author.id).await.unwrap() {
    DeleteOutcome::Blocked(books) => books,
    other => panic!("expected blocked delete, got {other:?}"),
  };
  assert_eq!(books.len(), 1);
  assert_eq!(books[0].id, book.id);
  assert_eq!(books[0].title, "Emma");
  assert_eq!(books[0].summary, "Summary of Emma");

  assert!(s.get_author(author.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_unknown_author_reports_not_found() {
  let s = store().await;
  let outcome = guard::delete_author(&s, AuthorId::new()).await.unwrap();
  assert_eq!(outcome, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn foreign_keys_back_up_the_guard() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  add_book(&s, "Emma", author.id, vec![]).await;

  // Bypassing the guard hits the schema constraint instead.
  assert!(s.delete_author(author.id).await.is_err());
  assert!(s.get_author(author.id).await.unwrap().is_some());
}

#[tokio::test]
async fn book_with_copies_is_blocked_until_copies_are_gone() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let book = add_book(&s, "Emma", author.id, vec![]).await;
  let copy = s
    .create_book_instance(new_copy(book.id, "Penguin", BookInstanceStatus::Available))
    .await
    .unwrap();

  match guard::delete_book(&s, book.id).await.unwrap() {
    DeleteOutcome::Blocked(copies) => assert_eq!(copies[0].id, copy.id),
    other => panic!("expected blocked delete, got {other:?}"),
  }

  assert_eq!(
    guard::delete_book_instance(&s, copy.id).await.unwrap(),
    DeleteOutcome::Deleted
  );
  assert_eq!(guard::delete_book(&s, book.id).await.unwrap(), DeleteOutcome::Deleted);
  assert!(s.get_book(book.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_genre_unfiles_its_books() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let romance = add_genre(&s, "Romance").await;
  let satire = add_genre(&s, "Satire").await;
  let book = add_book(&s, "Emma", author.id, vec![romance.id, satire.id]).await;

  assert_eq!(s.genre_books(romance.id).await.unwrap().len(), 1);
  assert_eq!(
    guard::delete_genre(&s, romance.id).await.unwrap(),
    DeleteOutcome::Deleted
  );

  let fetched = s.get_book(book.id).await.unwrap().unwrap();
  assert_eq!(fetched.genre, vec![satire.id]);
}

// ─── Books ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn book_update_replaces_the_genre_set() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let g1 = add_genre(&s, "Fiction").await;
  let g2 = add_genre(&s, "Romance").await;
  let g3 = add_genre(&s, "Satire").await;
  let book = add_book(&s, "Emma", author.id, vec![g2.id]).await;

  s.update_book(book.id, new_book("Emma", author.id, vec![g1.id, g3.id]))
    .await
    .unwrap()
    .unwrap();

  let mut stored = s.get_book(book.id).await.unwrap().unwrap().genre;
  stored.sort();
  let mut expected = vec![g1.id, g3.id];
  expected.sort();
  assert_eq!(stored, expected);
}

#[tokio::test]
async fn book_detail_resolves_author_and_genres() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let romance = add_genre(&s, "Romance").await;
  let book = add_book(&s, "Emma", author.id, vec![romance.id]).await;

  let detail = s.get_book_detail(book.id).await.unwrap().unwrap();
  assert_eq!(detail.book, book);
  assert_eq!(detail.author, author);
  assert_eq!(detail.genres, vec![romance]);

  assert!(s.get_book_detail(BookId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn book_without_genres_is_allowed() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let book = add_book(&s, "Emma", author.id, vec![]).await;

  let detail = s.get_book_detail(book.id).await.unwrap().unwrap();
  assert!(detail.genres.is_empty());
  assert!(detail.book.genre.is_empty());
}

#[tokio::test]
async fn book_listings_are_sorted_and_carry_authors() {
  let s = store().await;
  let austen = add_author(&s, "Jane", "Austen").await;
  let bronte = add_author(&s, "Emily", "Bronte").await;
  add_book(&s, "Wuthering Heights", bronte.id, vec![]).await;
  add_book(&s, "Emma", austen.id, vec![]).await;

  let listings = s.list_book_listings().await.unwrap();
  let titles: Vec<&str> = listings.iter().map(|l| l.book.title.as_str()).collect();
  assert_eq!(titles, ["Emma", "Wuthering Heights"]);
  assert_eq!(listings[0].author.id, austen.id);
  assert_eq!(listings[1].author.id, bronte.id);

  let books = s.list_books().await.unwrap();
  assert_eq!(books.len(), 2);
  assert_eq!(books[0].title, "Emma");
}

#[tokio::test]
async fn author_books_project_title_and_summary() {
  let s = store().await;
  let austen = add_author(&s, "Jane", "Austen").await;
  let other = add_author(&s, "Emily", "Bronte").await;
  add_book(&s, "Persuasion", austen.id, vec![]).await;
  add_book(&s, "Emma", austen.id, vec![]).await;
  add_book(&s, "Wuthering Heights", other.id, vec![]).await;

  let books = s.author_books(austen.id).await.unwrap();
  let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
  assert_eq!(titles, ["Emma", "Persuasion"]);
}

// ─── Genres ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_genre_by_name_ignores_case() {
  let s = store().await;
  let fantasy = add_genre(&s, "Fantasy").await;

  let found = s.find_genre_by_name("fANTASY").await.unwrap();
  assert_eq!(found, Some(fantasy));
  assert!(s.find_genre_by_name("Horror").await.unwrap().is_none());
}

#[tokio::test]
async fn genres_list_by_name_and_update_in_place() {
  let s = store().await;
  let poetry = add_genre(&s, "Poetry").await;
  add_genre(&s, "Drama").await;

  let names: Vec<String> =
    s.list_genres().await.unwrap().into_iter().map(|g| g.name).collect();
  assert_eq!(names, ["Drama", "Poetry"]);

  let renamed = s
    .update_genre(poetry.id, NewGenre { name: "Verse".into() })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(renamed.id, poetry.id);
  assert_eq!(s.get_genre(poetry.id).await.unwrap().unwrap().name, "Verse");
}

// ─── Book instances ──────────────────────────────────────────────────────────

#[tokio::test]
async fn copies_list_with_books_and_counts() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let genre = add_genre(&s, "Romance").await;
  let persuasion = add_book(&s, "Persuasion", author.id, vec![genre.id]).await;
  let emma = add_book(&s, "Emma", author.id, vec![]).await;

  s.create_book_instance(new_copy(persuasion.id, "Penguin", BookInstanceStatus::Available))
    .await
    .unwrap();
  s.create_book_instance(new_copy(emma.id, "Vintage", BookInstanceStatus::Loaned))
    .await
    .unwrap();
  s.create_book_instance(new_copy(emma.id, "Oxford", BookInstanceStatus::Available))
    .await
    .unwrap();

  let copies = s.list_book_instances().await.unwrap();
  let order: Vec<(&str, &str)> = copies
    .iter()
    .map(|c| (c.book.title.as_str(), c.instance.imprint.as_str()))
    .collect();
  assert_eq!(
    order,
    [("Emma", "Oxford"), ("Emma", "Vintage"), ("Persuasion", "Penguin")]
  );
  assert_eq!(copies[2].book.genre, vec![genre.id]);

  assert_eq!(s.count_books().await.unwrap(), 2);
  assert_eq!(s.count_book_instances().await.unwrap(), 3);
  assert_eq!(s.count_available_book_instances().await.unwrap(), 2);
  assert_eq!(s.count_genres().await.unwrap(), 1);
}

#[tokio::test]
async fn copy_update_and_detail() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let book = add_book(&s, "Emma", author.id, vec![]).await;
  let copy = s
    .create_book_instance(new_copy(book.id, "Penguin", BookInstanceStatus::Maintenance))
    .await
    .unwrap();

  let due = NaiveDate::from_ymd_opt(2024, 3, 1);
  let updated = s
    .update_book_instance(copy.id, NewBookInstance {
      book:     book.id,
      imprint:  "Penguin Classics".into(),
      status:   BookInstanceStatus::Loaned,
      due_back: due,
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.id, copy.id);

  let detail = s.get_book_instance_detail(copy.id).await.unwrap().unwrap();
  assert_eq!(detail.instance.status, BookInstanceStatus::Loaned);
  assert_eq!(detail.instance.due_back, due);
  assert_eq!(detail.instance.imprint, "Penguin Classics");
  assert_eq!(detail.book.id, book.id);
}

// ─── Write-time references ───────────────────────────────────────────────────

#[tokio::test]
async fn unknown_references_become_violations() {
  let s = store().await;
  let author = add_author(&s, "Jane", "Austen").await;
  let genre = add_genre(&s, "Romance").await;

  let ok = new_book("Emma", author.id, vec![genre.id]);
  assert!(guard::book_references(&s, &ok).await.unwrap().is_empty());

  let bad = new_book("Emma", AuthorId::new(), vec![genre.id, GenreId::new()]);
  let fields: Vec<String> = guard::book_references(&s, &bad)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.field)
    .collect();
  assert_eq!(fields, ["author", "genre"]);

  let orphan = new_copy(BookId::new(), "Penguin", BookInstanceStatus::Available);
  let violations = guard::book_instance_references(&s, &orphan).await.unwrap();
  assert_eq!(violations.len(), 1);
  assert_eq!(violations[0].field, "book");
}
