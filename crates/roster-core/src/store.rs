//! The `StudentStore` trait and the soft-fail [`Directory`] adapter.
//!
//! The trait is implemented by storage backends (`roster-store-sqlite`,
//! `roster-libsql`). Higher layers talk to a [`Directory`], which turns every
//! backend error into an empty result so a broken store degrades to "no
//! results" instead of taking the UI down.

use std::{future::Future, sync::Arc};

use tracing::warn;

use crate::student::{SearchResult, StudentRecord};

/// Maximum number of records returned by [`StudentStore::search_students`].
pub const SEARCH_LIMIT: usize = 50;

/// Default page size for [`StudentStore::get_all_students`].
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// `LIKE` pattern matching `query` anywhere in a column.
pub fn like_pattern(query: &str) -> String { format!("%{query}%") }

// ─── Statements ──────────────────────────────────────────────────────────────

/// The three statement shapes every SQL backend issues. Columns are always
/// selected in [`crate::student::COLUMNS`] order.
pub mod sql {
  use crate::student::column_list;

  /// Args: `?1` id pattern, `?2` name pattern, `?3` limit.
  pub fn search() -> String {
    format!(
      "SELECT {} FROM students WHERE STUDENT_ID LIKE ? OR E_NAME LIKE ? ORDER BY E_NAME LIMIT ?",
      column_list()
    )
  }

  /// Args: `?1` exact student id.
  pub fn by_id() -> String {
    format!("SELECT {} FROM students WHERE STUDENT_ID = ?", column_list())
  }

  /// Args: `?1` limit.
  pub fn all() -> String {
    format!("SELECT {} FROM students ORDER BY E_NAME LIMIT ?", column_list())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a student-records backend.
///
/// Each method maps to exactly one SQL statement shape. Case and locale
/// behaviour of text matching is whatever the backend's `LIKE` does.
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Records whose id or display name contains `query`, ordered by display
  /// name, at most [`SEARCH_LIMIT`].
  fn search_students<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<SearchResult, Self::Error>> + Send + 'a;

  /// Exact lookup by student id. Returns `None` if not found.
  fn get_student_by_id<'a>(
    &'a self,
    student_id: &'a str,
  ) -> impl Future<Output = Result<Option<StudentRecord>, Self::Error>> + Send + 'a;

  /// The first `limit` records ordered by display name.
  fn get_all_students(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<SearchResult, Self::Error>> + Send + '_;
}

// ─── Soft-fail adapter ───────────────────────────────────────────────────────

/// A [`StudentStore`] wrapped so that lookups never fail.
///
/// The `try_*` methods pass errors through for callers that want to report
/// them; the plain methods log and fall back to an empty result.
///
/// Cloning is cheap — the store is reference-counted.
pub struct Directory<S> {
  store: Arc<S>,
}

impl<S> Clone for Directory<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: StudentStore> Directory<S> {
  pub fn new(store: S) -> Self { Self { store: Arc::new(store) } }

  pub fn from_arc(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  pub async fn try_search(&self, query: &str) -> Result<SearchResult, S::Error> {
    self.store.search_students(query).await
  }

  pub async fn search_students(&self, query: &str) -> SearchResult {
    self.try_search(query).await.unwrap_or_else(|e| {
      warn!(error = %e, query, "student search failed");
      SearchResult::default()
    })
  }

  pub async fn get_student_by_id(&self, student_id: &str) -> Option<StudentRecord> {
    self
      .store
      .get_student_by_id(student_id)
      .await
      .unwrap_or_else(|e| {
        warn!(error = %e, student_id, "student fetch failed");
        None
      })
  }

  pub async fn try_get_all_students(&self, limit: usize) -> Result<SearchResult, S::Error> {
    self.store.get_all_students(limit).await
  }

  pub async fn get_all_students(&self, limit: usize) -> SearchResult {
    self.try_get_all_students(limit).await.unwrap_or_else(|e| {
      warn!(error = %e, limit, "student listing failed");
      SearchResult::default()
    })
  }
}
