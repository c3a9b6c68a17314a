//! Recently viewed students, persisted under a single storage key.
//!
//! The list is most-recent-first, deduplicated by student id and capped at
//! [`MAX_HISTORY_ITEMS`]. The `try_*` methods surface storage errors; the
//! plain methods are the boundary used by the UI and never fail: a broken
//! read is an empty history and a broken write is dropped.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Result, storage::KeyValueStore, student::StudentRecord};

/// Storage key holding the JSON-encoded history list.
pub const HISTORY_KEY: &str = "student_search_history";

pub const MAX_HISTORY_ITEMS: usize = 15;

// ─── HistoryItem ─────────────────────────────────────────────────────────────

/// A snapshot of a viewed record and when it was viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
  pub student:   StudentRecord,
  /// Unix epoch milliseconds.
  pub timestamp: i64,
}

impl HistoryItem {
  /// Compact age relative to `now`: `now`, `5m`, `3h`, `2d`, or the calendar
  /// date once it is a week old.
  pub fn age_label(&self, now: DateTime<Utc>) -> String {
    let diff = now.timestamp_millis() - self.timestamp;
    let minutes = diff / 60_000;
    let hours = diff / 3_600_000;
    let days = diff / 86_400_000;

    if minutes < 1 {
      "now".to_string()
    } else if minutes < 60 {
      format!("{minutes}m")
    } else if hours < 24 {
      format!("{hours}h")
    } else if days < 7 {
      format!("{days}d")
    } else {
      DateTime::from_timestamp_millis(self.timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
    }
  }
}

// ─── HistoryStore ────────────────────────────────────────────────────────────

/// History persisted through any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct HistoryStore<K> {
  storage: K,
}

impl<K: KeyValueStore> HistoryStore<K> {
  pub fn new(storage: K) -> Self { Self { storage } }

  pub fn try_list(&self) -> Result<Vec<HistoryItem>> {
    match self.storage.get(HISTORY_KEY)? {
      Some(raw) => Ok(serde_json::from_str(&raw)?),
      None => Ok(Vec::new()),
    }
  }

  /// Record `student` as viewed now.
  pub fn try_add(&self, student: StudentRecord) -> Result<()> {
    self.try_add_at(student, Utc::now().timestamp_millis())
  }

  fn try_add_at(&self, student: StudentRecord, timestamp: i64) -> Result<()> {
    // A corrupt payload is replaced rather than blocking new entries.
    let mut items = self.list();
    items.retain(|item| item.student.student_id != student.student_id);
    items.insert(0, HistoryItem { student, timestamp });
    items.truncate(MAX_HISTORY_ITEMS);
    self.write(&items)
  }

  pub fn try_remove(&self, student_id: &str) -> Result<()> {
    let mut items = self.list();
    items.retain(|item| item.student.student_id != student_id);
    self.write(&items)
  }

  pub fn try_clear(&self) -> Result<()> { self.storage.remove(HISTORY_KEY) }

  fn write(&self, items: &[HistoryItem]) -> Result<()> {
    let raw = serde_json::to_string(items)?;
    self.storage.set(HISTORY_KEY, &raw)
  }

  // ── Soft-fail boundary ───────────────────────────────────────────────────

  /// Most-recent-first history; empty if storage is unreadable.
  pub fn list(&self) -> Vec<HistoryItem> {
    self.try_list().unwrap_or_else(|e| {
      warn!(error = %e, "failed to read search history");
      Vec::new()
    })
  }

  pub fn add(&self, student: StudentRecord) {
    if let Err(e) = self.try_add(student) {
      warn!(error = %e, "failed to save search history");
    }
  }

  pub fn remove(&self, student_id: &str) {
    if let Err(e) = self.try_remove(student_id) {
      warn!(error = %e, student_id, "failed to remove from search history");
    }
  }

  pub fn clear(&self) {
    if let Err(e) = self.try_clear() {
      warn!(error = %e, "failed to clear search history");
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;
  use crate::{Error, storage::MemoryStorage};

  fn student(n: usize) -> StudentRecord {
    StudentRecord::new(format!("S{n:03}"), format!("Student {n}"))
  }

  fn store() -> HistoryStore<MemoryStorage> { HistoryStore::new(MemoryStorage::new()) }

  /// Storage that is always down.
  struct BrokenStorage;

  impl KeyValueStore for BrokenStorage {
    fn get(&self, _: &str) -> Result<Option<String>> {
      Err(Error::StorageUnavailable("down".into()))
    }
    fn set(&self, _: &str, _: &str) -> Result<()> {
      Err(Error::StorageUnavailable("down".into()))
    }
    fn remove(&self, _: &str) -> Result<()> {
      Err(Error::StorageUnavailable("down".into()))
    }
  }

  #[test]
  fn add_prepends_most_recent() {
    let h = store();
    h.add(student(1));
    h.add(student(2));
    let ids: Vec<_> = h.list().into_iter().map(|i| i.student.student_id).collect();
    assert_eq!(ids, ["S002", "S001"]);
  }

  #[test]
  fn re_adding_moves_to_front_with_newest_timestamp() {
    let h = store();
    h.try_add_at(student(1), 1_000).unwrap();
    h.try_add_at(student(2), 2_000).unwrap();
    h.try_add_at(student(1), 3_000).unwrap();

    let items = h.list();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].student.student_id, "S001");
    assert_eq!(items[0].timestamp, 3_000);
    assert_eq!(items[1].student.student_id, "S002");
  }

  #[test]
  fn adding_same_record_twice_keeps_one_entry() {
    let h = store();
    h.add(student(7));
    let first = h.list()[0].timestamp;
    h.add(student(7));

    let items = h.list();
    assert_eq!(items.len(), 1);
    assert!(items[0].timestamp >= first);
  }

  #[test]
  fn capped_at_fifteen_dropping_oldest() {
    let h = store();
    for n in 1..=16 {
      h.try_add_at(student(n), n as i64).unwrap();
    }
    let items = h.list();
    assert_eq!(items.len(), MAX_HISTORY_ITEMS);
    assert_eq!(items[0].student.student_id, "S016");
    assert_eq!(items[14].student.student_id, "S002");
    assert!(items.iter().all(|i| i.student.student_id != "S001"));
  }

  #[test]
  fn remove_filters_by_id() {
    let h = store();
    h.add(student(1));
    h.add(student(2));
    h.remove("S001");
    h.remove("missing");
    let items = h.list();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].student.student_id, "S002");
  }

  #[test]
  fn clear_then_list_is_empty() {
    let h = store();
    h.add(student(1));
    h.clear();
    assert!(h.list().is_empty());
  }

  #[test]
  fn corrupt_payload_reads_as_empty_and_is_replaced() {
    let storage = std::sync::Arc::new(MemoryStorage::new());
    storage.set(HISTORY_KEY, "{not json").unwrap();
    let h = HistoryStore::new(storage.clone());

    assert!(h.try_list().is_err());
    assert!(h.list().is_empty());

    h.add(student(3));
    assert_eq!(h.list().len(), 1);
  }

  #[test]
  fn broken_storage_never_panics() {
    let h = HistoryStore::new(BrokenStorage);
    assert!(h.list().is_empty());
    h.add(student(1));
    h.remove("S001");
    h.clear();
    assert!(h.try_add(student(1)).is_err());
  }

  #[test]
  fn persisted_shape_matches_columns() {
    let storage = std::sync::Arc::new(MemoryStorage::new());
    let h = HistoryStore::new(storage.clone());
    h.try_add_at(student(1), 42).unwrap();

    let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v[0]["timestamp"], 42);
    assert_eq!(v[0]["student"]["STUDENT_ID"], "S001");
  }

  #[test]
  fn age_labels() {
    let now = Utc::now();
    let at = |d: Duration| HistoryItem {
      student:   student(1),
      timestamp: (now - d).timestamp_millis(),
    };
    assert_eq!(at(Duration::seconds(10)).age_label(now), "now");
    assert_eq!(at(Duration::minutes(5)).age_label(now), "5m");
    assert_eq!(at(Duration::hours(3)).age_label(now), "3h");
    assert_eq!(at(Duration::days(2)).age_label(now), "2d");
    assert_eq!(at(Duration::days(30)).age_label(now).len(), "2026-01-01".len());
    // Clock skew: a timestamp in the future is simply "now".
    assert_eq!(at(Duration::minutes(-5)).age_label(now), "now");
  }
}
