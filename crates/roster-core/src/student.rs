//! Student records — the rows served by every store backend.
//!
//! Field names on the wire (history payloads, remote rows) are the upper-case
//! column names of the `students` table, so a record serialises exactly as the
//! row it came from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Column order used by every `SELECT` issued against the `students` table.
/// Backends decode rows positionally against this list.
pub const COLUMNS: [&str; 17] = [
  "STUDENT_ID",
  "E_NAME",
  "CPR_NO",
  "PB_EMAIL",
  "MOBILE",
  "GENDER",
  "BDATE",
  "CITIZENSHIP",
  "PROFILE_PICTURE",
  "COLLEGE",
  "MAJR1",
  "PERS_EMAIL",
  "SPRADDR_STREET_LINE1",
  "SPRADDR_STREET_LINE2",
  "SPRADDR_STREET_LINE3",
  "SPRADDR_CITY",
  "SPRADDR_ZIP",
];

/// Comma-separated [`COLUMNS`], ready to splice into a `SELECT`.
pub fn column_list() -> String { COLUMNS.join(", ") }

// ─── StudentRecord ───────────────────────────────────────────────────────────

/// One row of the student directory.
///
/// `student_id` is unique and non-empty; `name` is always present. Every other
/// field is nullable and renders as "not shown" when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
  #[serde(rename = "STUDENT_ID")]
  pub student_id:      String,
  #[serde(rename = "E_NAME")]
  pub name:            String,
  /// National identity number.
  #[serde(rename = "CPR_NO")]
  pub cpr_no:          Option<String>,
  /// Institutional email address.
  #[serde(rename = "PB_EMAIL")]
  pub email:           Option<String>,
  #[serde(rename = "MOBILE")]
  pub mobile:          Option<String>,
  #[serde(rename = "GENDER")]
  pub gender:          Option<String>,
  /// Birth date as stored; usually `YYYY-MM-DD`.
  #[serde(rename = "BDATE")]
  pub birth_date:      Option<String>,
  #[serde(rename = "CITIZENSHIP")]
  pub citizenship:     Option<String>,
  /// URI of the profile picture.
  #[serde(rename = "PROFILE_PICTURE")]
  pub profile_picture: Option<String>,
  #[serde(rename = "COLLEGE")]
  pub college:         Option<String>,
  #[serde(rename = "MAJR1")]
  pub major:           Option<String>,
  #[serde(rename = "PERS_EMAIL")]
  pub personal_email:  Option<String>,
  #[serde(rename = "SPRADDR_STREET_LINE1")]
  pub street_line1:    Option<String>,
  #[serde(rename = "SPRADDR_STREET_LINE2")]
  pub street_line2:    Option<String>,
  #[serde(rename = "SPRADDR_STREET_LINE3")]
  pub street_line3:    Option<String>,
  #[serde(rename = "SPRADDR_CITY")]
  pub city:            Option<String>,
  #[serde(rename = "SPRADDR_ZIP")]
  pub zip:             Option<String>,
}

impl StudentRecord {
  /// Convenience constructor with every optional field unset.
  pub fn new(student_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      student_id:      student_id.into(),
      name:            name.into(),
      cpr_no:          None,
      email:           None,
      mobile:          None,
      gender:          None,
      birth_date:      None,
      citizenship:     None,
      profile_picture: None,
      college:         None,
      major:           None,
      personal_email:  None,
      street_line1:    None,
      street_line2:    None,
      street_line3:    None,
      city:            None,
      zip:             None,
    }
  }

  /// Street lines, city and zip joined with `", "`, skipping blanks.
  pub fn address(&self) -> Option<String> {
    let parts: Vec<&str> = [
      self.street_line1.as_deref(),
      self.street_line2.as_deref(),
      self.street_line3.as_deref(),
      self.city.as_deref(),
      self.zip.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
  }

  /// Birth date as `Month D, YYYY`. Unparseable dates are returned verbatim
  /// and a missing date is `N/A`.
  pub fn birth_date_display(&self) -> String {
    let Some(raw) = self.birth_date.as_deref() else {
      return "N/A".to_string();
    };
    // Stores sometimes hand back a full timestamp; the date prefix is enough.
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
      Ok(d) => d.format("%B %-d, %Y").to_string(),
      Err(_) => raw.to_string(),
    }
  }
}

// ─── SearchResult ────────────────────────────────────────────────────────────

/// An ordered page of records (ascending display name) plus its length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
  pub students: Vec<StudentRecord>,
  pub count:    usize,
}

impl SearchResult {
  pub fn is_empty(&self) -> bool { self.students.is_empty() }
}

impl From<Vec<StudentRecord>> for SearchResult {
  fn from(students: Vec<StudentRecord>) -> Self {
    let count = students.len();
    Self { students, count }
  }
}
