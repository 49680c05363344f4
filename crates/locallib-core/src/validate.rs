//! Field-level validation of candidate forms.
//!
//! Each `validate` function checks a sanitised candidate and either returns
//! the typed input the store accepts or every violation found, one per
//! offending field. Nothing here touches the store; reference existence is
//! checked separately in [`crate::guard`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
  author::NewAuthor,
  book::NewBook,
  book_instance::{BookInstanceStatus, NewBookInstance},
  date::parse_iso_date,
  form::{AuthorForm, BookForm, BookInstanceForm, GenreForm},
  genre::NewGenre,
  id::{AuthorId, BookId, GenreId},
};

const NAME_MAX_CHARS: usize = 100;
const GENRE_MIN_CHARS: usize = 3;

pub(crate) const AUTHOR_MISSING: &str = "Author does not exist.";
pub(crate) const GENRE_MISSING: &str = "Genre does not exist.";
pub(crate) const BOOK_MISSING: &str = "Book does not exist.";

// ─── Violations ──────────────────────────────────────────────────────────────

/// A single rejected field and the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  pub field:   String,
  pub message: String,
}

impl Violation {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

/// Collects violations while the typed fields are being assembled.
#[derive(Debug, Default)]
struct Checker {
  violations: Vec<Violation>,
}

impl Checker {
  fn reject(&mut self, field: &str, message: &str) {
    self.violations.push(Violation::new(field, message));
  }

  fn required(&mut self, field: &str, value: &str, message: &str) -> bool {
    if value.is_empty() {
      self.reject(field, message);
      false
    } else {
      true
    }
  }

  fn name(&mut self, field: &str, value: &str, label: &str) {
    if !self.required(field, value, &format!("{label} must be specified.")) {
      return;
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
      self.reject(field, &format!("{label} has non-alphanumeric characters."));
    } else if value.chars().count() > NAME_MAX_CHARS {
      self.reject(
        field,
        &format!("{label} must not exceed {NAME_MAX_CHARS} characters."),
      );
    }
  }

  /// Empty input is absent; anything else must be a calendar date.
  fn optional_date(&mut self, field: &str, value: &str, message: &str) -> Option<NaiveDate> {
    if value.is_empty() {
      return None;
    }
    let parsed = parse_iso_date(value);
    if parsed.is_none() {
      self.reject(field, message);
    }
    parsed
  }

  fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Vec<Violation>> {
    if self.violations.is_empty() {
      value().ok_or(self.violations)
    } else {
      Err(self.violations)
    }
  }
}

// ─── Sanitisation ────────────────────────────────────────────────────────────

/// Replace the characters that are significant in HTML with entities.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      '/' => out.push_str("&#x2F;"),
      '\\' => out.push_str("&#x5C;"),
      '`' => out.push_str("&#96;"),
      other => out.push(other),
    }
  }
  out
}

/// Trim, then escape.
pub fn sanitize(s: &str) -> String { escape_html(s.trim()) }

/// Length of sanitised text as the user typed it: every entity written by
/// [`escape_html`] counts as one character.
fn typed_len(s: &str) -> usize {
  let mut len = 0;
  let mut in_entity = false;
  for c in s.chars() {
    match c {
      '&' => {
        in_entity = true;
        len += 1;
      }
      ';' if in_entity => in_entity = false,
      _ if in_entity => {}
      _ => len += 1,
    }
  }
  len
}

// ─── Per-entity rules ────────────────────────────────────────────────────────

pub fn author(form: &AuthorForm) -> Result<NewAuthor, Vec<Violation>> {
  let mut check = Checker::default();
  check.name("first_name", &form.first_name, "First name");
  check.name("family_name", &form.family_name, "Family name");
  let date_of_birth =
    check.optional_date("date_of_birth", &form.date_of_birth, "Invalid date of birth");
  let date_of_death =
    check.optional_date("date_of_death", &form.date_of_death, "Invalid date of death");

  check.finish(|| {
    Some(NewAuthor {
      first_name: form.first_name.clone(),
      family_name: form.family_name.clone(),
      date_of_birth,
      date_of_death,
    })
  })
}

pub fn genre(form: &GenreForm) -> Result<NewGenre, Vec<Violation>> {
  let mut check = Checker::default();
  let len = typed_len(&form.name);
  if len < GENRE_MIN_CHARS {
    check.reject(
      "name",
      &format!("Genre name must contain at least {GENRE_MIN_CHARS} characters"),
    );
  } else if len > NAME_MAX_CHARS {
    check.reject(
      "name",
      &format!("Genre name must not exceed {NAME_MAX_CHARS} characters"),
    );
  }

  check.finish(|| Some(NewGenre { name: form.name.clone() }))
}

pub fn book(form: &BookForm) -> Result<NewBook, Vec<Violation>> {
  let mut check = Checker::default();
  check.required("title", &form.title, "Title must not be empty.");

  let author = if check.required("author", &form.author, "Author must not be empty.") {
    let parsed = form.author.parse::<AuthorId>().ok();
    if parsed.is_none() {
      check.reject("author", AUTHOR_MISSING);
    }
    parsed
  } else {
    None
  };

  check.required("summary", &form.summary, "Summary must not be empty.");
  check.required("isbn", &form.isbn, "ISBN must not be empty");

  let mut genre = Vec::with_capacity(form.genre.len());
  for raw in form.genre.iter().filter(|g| !g.is_empty()) {
    match raw.parse::<GenreId>() {
      Ok(id) if !genre.contains(&id) => genre.push(id),
      Ok(_) => {}
      Err(_) => check.reject("genre", GENRE_MISSING),
    }
  }

  check.finish(|| {
    Some(NewBook {
      title: form.title.clone(),
      summary: form.summary.clone(),
      isbn: form.isbn.clone(),
      author: author?,
      genre,
    })
  })
}

pub fn book_instance(form: &BookInstanceForm) -> Result<NewBookInstance, Vec<Violation>> {
  let mut check = Checker::default();

  let book = if check.required("book", &form.book, "Book must be specified") {
    let parsed = form.book.parse::<BookId>().ok();
    if parsed.is_none() {
      check.reject("book", BOOK_MISSING);
    }
    parsed
  } else {
    None
  };

  check.required("imprint", &form.imprint, "Imprint must be specified");

  let status = if form.status.is_empty() {
    BookInstanceStatus::default()
  } else {
    form.status.parse::<BookInstanceStatus>().unwrap_or_else(|_| {
      check.reject("status", "Invalid status");
      BookInstanceStatus::default()
    })
  };

  let due_back = check.optional_date("due_back", &form.due_back, "Invalid date");

  check.finish(|| {
    Some(NewBookInstance {
      book: book?,
      imprint: form.imprint.clone(),
      status,
      due_back,
    })
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::form::FormData;

  fn author_form(pairs: &[(&str, &str)]) -> AuthorForm {
    AuthorForm::from_input(&pairs.iter().copied().collect(), None)
  }

  fn fields(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.field.as_str()).collect()
  }

  #[test]
  fn escape_covers_html_specials() {
    assert_eq!(
      escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
      "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;&#x2F;a&gt;"
    );
    assert_eq!(sanitize("  plain  "), "plain");
  }

  #[test]
  fn valid_author_with_empty_death_date() {
    let form = author_form(&[
      ("first_name", " Jane "),
      ("family_name", "Austen"),
      ("date_of_birth", "1775-12-16"),
      ("date_of_death", ""),
    ]);
    let author = author(&form).unwrap();
    assert_eq!(author.first_name, "Jane");
    assert_eq!(author.family_name, "Austen");
    assert_eq!(author.date_of_birth, NaiveDate::from_ymd_opt(1775, 12, 16));
    assert_eq!(author.date_of_death, None);
  }

  #[test]
  fn non_alphanumeric_first_name_is_rejected() {
    let form = author_form(&[("first_name", "Jo-hn"), ("family_name", "Smith")]);
    let errors = author(&form).unwrap_err();
    assert_eq!(
      errors,
      vec![Violation::new(
        "first_name",
        "First name has non-alphanumeric characters."
      )]
    );
  }

  #[test]
  fn missing_names_report_one_error_each() {
    let errors = author(&author_form(&[])).unwrap_err();
    assert_eq!(
      errors,
      vec![
        Violation::new("first_name", "First name must be specified."),
        Violation::new("family_name", "Family name must be specified."),
      ]
    );
  }

  #[test]
  fn overlong_name_is_rejected() {
    let long = "a".repeat(NAME_MAX_CHARS + 1);
    let form = author_form(&[("first_name", &long), ("family_name", "X")]);
    assert_eq!(fields(&author(&form).unwrap_err()), ["first_name"]);
  }

  #[test]
  fn malformed_dates_are_rejected() {
    let form = author_form(&[
      ("first_name", "Jane"),
      ("family_name", "Austen"),
      ("date_of_birth", "sometime"),
      ("date_of_death", "1817-02-30"),
    ]);
    let errors = author(&form).unwrap_err();
    assert_eq!(
      errors,
      vec![
        Violation::new("date_of_birth", "Invalid date of birth"),
        Violation::new("date_of_death", "Invalid date of death"),
      ]
    );
  }

  #[test]
  fn unpadded_or_signed_dates_are_rejected() {
    for raw in ["2020-1-5", "+2020-01-05"] {
      let form = author_form(&[
        ("first_name", "Jane"),
        ("family_name", "Austen"),
        ("date_of_birth", raw),
      ]);
      assert_eq!(
        author(&form).unwrap_err(),
        vec![Violation::new("date_of_birth", "Invalid date of birth")]
      );

      let copy = BookInstanceForm {
        book: BookId::new().to_string(),
        imprint: "Penguin".into(),
        due_back: raw.into(),
        ..BookInstanceForm::default()
      };
      assert_eq!(fields(&book_instance(&copy).unwrap_err()), ["due_back"]);
    }
  }

  #[test]
  fn genre_length_counts_typed_characters() {
    let form = |raw: &str| GenreForm::from_input(&[("name", raw)].into_iter().collect(), None);

    let short = form("A&");
    assert_eq!(short.name, "A&amp;");
    assert_eq!(fields(&genre(&short).unwrap_err()), ["name"]);

    assert_eq!(genre(&form("R&B")).unwrap().name, "R&amp;B");
  }

  #[test]
  fn genre_name_length_bounds() {
    let short = GenreForm { id: None, name: "ab".into() };
    assert_eq!(
      genre(&short).unwrap_err(),
      vec![Violation::new("name", "Genre name must contain at least 3 characters")]
    );
    let ok = GenreForm { id: None, name: "Fantasy".into() };
    assert_eq!(genre(&ok).unwrap().name, "Fantasy");
    let long = GenreForm { id: None, name: "x".repeat(101) };
    assert!(genre(&long).is_err());
  }

  #[test]
  fn empty_title_is_reported() {
    let author_id = AuthorId::new();
    let input: FormData = [
      ("title", "".to_owned()),
      ("author", author_id.to_string()),
      ("summary", "s".to_owned()),
      ("isbn", "i".to_owned()),
    ]
    .into_iter()
    .collect();
    let errors = book(&BookForm::from_input(&input, None)).unwrap_err();
    assert_eq!(errors, vec![Violation::new("title", "Title must not be empty.")]);
  }

  #[test]
  fn book_genres_are_parsed_and_deduplicated() {
    let author_id = AuthorId::new();
    let g1 = GenreId::new();
    let form = BookForm {
      id:      None,
      title:   "Emma".into(),
      author:  author_id.to_string(),
      summary: "A novel".into(),
      isbn:    "9780141439587".into(),
      genre:   vec![g1.to_string(), g1.to_string(), String::new()],
    };
    let book = book(&form).unwrap();
    assert_eq!(book.author, author_id);
    assert_eq!(book.genre, vec![g1]);
  }

  #[test]
  fn malformed_references_are_violations() {
    let form = BookForm {
      id:      None,
      title:   "Emma".into(),
      author:  "nobody".into(),
      summary: "A novel".into(),
      isbn:    "1".into(),
      genre:   vec!["nothing".into()],
    };
    assert_eq!(
      book(&form).unwrap_err(),
      vec![
        Violation::new("author", AUTHOR_MISSING),
        Violation::new("genre", GENRE_MISSING),
      ]
    );
  }

  #[test]
  fn book_instance_status_defaults_and_rejects_unknown() {
    let book_id = BookId::new();
    let mut form = BookInstanceForm {
      id:       None,
      book:     book_id.to_string(),
      imprint:  "Penguin".into(),
      status:   String::new(),
      due_back: String::new(),
    };
    let copy = book_instance(&form).unwrap();
    assert_eq!(copy.status, BookInstanceStatus::Maintenance);
    assert_eq!(copy.due_back, None);

    form.status = "Lost".into();
    assert_eq!(fields(&book_instance(&form).unwrap_err()), ["status"]);
  }

  #[test]
  fn book_instance_requires_book_and_imprint() {
    let errors = book_instance(&BookInstanceForm::default()).unwrap_err();
    assert_eq!(fields(&errors), ["book", "imprint"]);
  }
}
