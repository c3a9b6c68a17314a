//! Decoding `students` rows into [`StudentRecord`].
//!
//! Rows are always selected in [`COLUMNS`] order. Upstream data is loosely
//! typed (ids and zip codes are sometimes stored as integers), so every column
//! is read leniently as text.

use rusqlite::{Row, types::ValueRef};

use roster_core::student::{COLUMNS, StudentRecord};

/// Read column `idx` as text, stringifying numeric values.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
  Ok(match row.get_ref(idx)? {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
  })
}

fn required(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
  text(row, idx)?.ok_or_else(|| {
    rusqlite::Error::InvalidColumnType(
      idx,
      COLUMNS[idx].to_owned(),
      rusqlite::types::Type::Null,
    )
  })
}

/// Map a row selected in [`COLUMNS`] order.
pub fn decode_student(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
  Ok(StudentRecord {
    student_id:      required(row, 0)?,
    name:            required(row, 1)?,
    cpr_no:          text(row, 2)?,
    email:           text(row, 3)?,
    mobile:          text(row, 4)?,
    gender:          text(row, 5)?,
    birth_date:      text(row, 6)?,
    citizenship:     text(row, 7)?,
    profile_picture: text(row, 8)?,
    college:         text(row, 9)?,
    major:           text(row, 10)?,
    personal_email:  text(row, 11)?,
    street_line1:    text(row, 12)?,
    street_line2:    text(row, 13)?,
    street_line3:    text(row, 14)?,
    city:            text(row, 15)?,
    zip:             text(row, 16)?,
  })
}

/// Bind values for an `INSERT` in [`COLUMNS`] order.
pub fn encode_student(s: &StudentRecord) -> [Option<&str>; 17] {
  [
    Some(s.student_id.as_str()),
    Some(s.name.as_str()),
    s.cpr_no.as_deref(),
    s.email.as_deref(),
    s.mobile.as_deref(),
    s.gender.as_deref(),
    s.birth_date.as_deref(),
    s.citizenship.as_deref(),
    s.profile_picture.as_deref(),
    s.college.as_deref(),
    s.major.as_deref(),
    s.personal_email.as_deref(),
    s.street_line1.as_deref(),
    s.street_line2.as_deref(),
    s.street_line3.as_deref(),
    s.city.as_deref(),
    s.zip.as_deref(),
  ]
}
