//! `roster import` — seed the local SQLite store from a JSON export.

use std::path::Path;

use anyhow::{Context as _, bail};
use roster_core::student::StudentRecord;
use roster_store_sqlite::SqliteStore;

use crate::settings::{Backend, Settings};

pub async fn run(settings: &Settings, file: &Path) -> anyhow::Result<()> {
  let Backend::Local(db) = settings.backend() else {
    bail!("import writes to a local SQLite file, but db_url points at a remote store");
  };

  let written = import_file(&db, file).await?;
  println!("imported {written} students into {}", db.display());
  Ok(())
}

/// Upsert every record in `file` (a JSON array) into the store at `db`.
async fn import_file(db: &Path, file: &Path) -> anyhow::Result<usize> {
  let raw = std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))?;
  let students: Vec<StudentRecord> = serde_json::from_str(&raw)
    .with_context(|| format!("parsing {} as a list of students", file.display()))?;

  if let Some(parent) = db.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  let store = SqliteStore::open(db)
    .await
    .with_context(|| format!("failed to open store at {db:?}"))?;

  store
    .upsert_students(students)
    .await
    .context("writing students")
}

#[cfg(test)]
mod tests {
  use roster_core::store::StudentStore;

  use super::*;

  #[tokio::test]
  async fn imports_json_export() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let file = dir.join("students.json");
    std::fs::write(
      &file,
      r#"[
        {"STUDENT_ID": "100234", "E_NAME": "Jane Doe", "MAJR1": "CS", "SPRADDR_ZIP": "317"},
        {"STUDENT_ID": "200111", "E_NAME": "John Roe"}
      ]"#,
    )
    .unwrap();
    let db = dir.join("data").join("roster.db");

    assert_eq!(import_file(&db, &file).await.unwrap(), 2);

    let store = SqliteStore::open(&db).await.unwrap();
    let jane = store.get_student_by_id("100234").await.unwrap().unwrap();
    assert_eq!(jane.name, "Jane Doe");
    assert_eq!(jane.major.as_deref(), Some("CS"));
    assert_eq!(store.search_students("Ro").await.unwrap().count, 1);
  }

  #[tokio::test]
  async fn rejects_malformed_export() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let file = dir.join("students.json");
    std::fs::write(&file, r#"{"STUDENT_ID": "1"}"#).unwrap();

    let err = import_file(&dir.join("roster.db"), &file).await.unwrap_err();
    assert!(err.to_string().contains("list of students"));
  }
}
