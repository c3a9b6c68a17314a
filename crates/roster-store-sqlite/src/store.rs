//! [`SqliteStore`] — the SQLite implementation of [`StudentStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::info;

use roster_core::{
  store::{SEARCH_LIMIT, StudentStore, like_pattern, sql},
  student::{COLUMNS, SearchResult, StudentRecord, column_list},
};

use crate::{
  Error, Result,
  encode::{decode_student, encode_student},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A student directory backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
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

  /// Insert or replace `students` in one transaction. Returns the number of
  /// rows written.
  ///
  /// The whole batch is rejected if any record has an empty id or name.
  pub async fn upsert_students(&self, students: Vec<StudentRecord>) -> Result<usize> {
    if let Some(bad) = students
      .iter()
      .find(|s| s.student_id.trim().is_empty() || s.name.trim().is_empty())
    {
      return Err(Error::InvalidRecord(format!(
        "id {:?} / name {:?}",
        bad.student_id, bad.name
      )));
    }

    let placeholders = vec!["?"; COLUMNS.len()].join(", ");
    let insert = format!(
      "INSERT OR REPLACE INTO students ({}) VALUES ({placeholders})",
      column_list()
    );

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(&insert)?;
          for s in &students {
            written += stmt.execute(rusqlite::params_from_iter(encode_student(s)))?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    info!(written, "imported students");
    Ok(written)
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn query_students(
    &self,
    sql: String,
    args: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<StudentRecord>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), decode_student)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = Error;

  async fn search_students(&self, query: &str) -> Result<SearchResult> {
    let pattern = like_pattern(query);
    let rows = self
      .query_students(sql::search(), vec![
        pattern.clone().into(),
        pattern.into(),
        (SEARCH_LIMIT as i64).into(),
      ])
      .await?;
    Ok(rows.into())
  }

  async fn get_student_by_id(&self, student_id: &str) -> Result<Option<StudentRecord>> {
    let id = student_id.to_owned();
    let sql = sql::by_id();

    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], decode_student)
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn get_all_students(&self, limit: usize) -> Result<SearchResult> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = self.query_students(sql::all(), vec![limit.into()]).await?;
    Ok(rows.into())
  }
}
