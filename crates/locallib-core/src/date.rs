//! Calendar-date parsing and display helpers shared by the entity types and
//! the validation layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Whether `s` opens with a zero-padded `YYYY-MM-DD`. chrono alone accepts
/// unpadded and signed fields.
fn has_calendar_date_prefix(s: &str) -> bool {
  let bytes = s.as_bytes();
  bytes.len() >= 10
    && bytes[..10].iter().enumerate().all(|(i, b)| match i {
      4 | 7 => *b == b'-',
      _ => b.is_ascii_digit(),
    })
}

/// Parse an ISO-8601 calendar date. A trailing time component is accepted and
/// discarded.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
  if !has_calendar_date_prefix(s) {
    return None;
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    .or_else(|| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
    })
    .or_else(|| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|dt| dt.date())
    })
}

/// Medium display form, e.g. `Dec 16, 1775`.
pub(crate) fn format_medium(d: NaiveDate) -> String {
  d.format("%b %-d, %Y").to_string()
}
