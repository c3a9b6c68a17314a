//! Integration tests for `SqliteStore` against an in-memory database.

use roster_core::{
  store::{Directory, SEARCH_LIMIT, StudentStore},
  student::StudentRecord,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn jane() -> StudentRecord {
  let mut s = StudentRecord::new("100234", "Jane Doe");
  s.major = Some("Computer Science".into());
  s.birth_date = Some("2002-05-14".into());
  s
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.upsert_students(vec![
    jane(),
    StudentRecord::new("200111", "Adam Smith"),
    StudentRecord::new("300999", "Zainab Ali"),
    StudentRecord::new("100235", "Bob Janeway"),
  ])
  .await
  .unwrap();
  s
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_by_exact_id_returns_single_record() {
  let s = seeded().await;
  let r = s.search_students("100234").await.unwrap();
  assert_eq!(r.count, 1);
  assert_eq!(r.students, vec![jane()]);
}

#[tokio::test]
async fn search_matches_id_or_name_ordered_by_name() {
  let s = seeded().await;

  // "1002" hits two ids; "Jane" hits two names.
  let by_id = s.search_students("1002").await.unwrap();
  let names: Vec<_> = by_id.students.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["Bob Janeway", "Jane Doe"]);

  let by_name = s.search_students("Jane").await.unwrap();
  let names: Vec<_> = by_name.students.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["Bob Janeway", "Jane Doe"]);
}

#[tokio::test]
async fn search_with_no_match_is_empty() {
  let s = seeded().await;
  let r = s.search_students("nobody").await.unwrap();
  assert_eq!(r.count, 0);
  assert!(r.students.is_empty());
}

#[tokio::test]
async fn search_is_capped() {
  let s = store().await;
  let many = (0..SEARCH_LIMIT + 10)
    .map(|n| StudentRecord::new(format!("9{n:05}"), format!("Student {n:03}")))
    .collect();
  s.upsert_students(many).await.unwrap();

  let r = s.search_students("Student").await.unwrap();
  assert_eq!(r.count, SEARCH_LIMIT);
  assert_eq!(r.students[0].name, "Student 000");
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_by_id_found_and_missing() {
  let s = seeded().await;
  assert_eq!(s.get_student_by_id("100234").await.unwrap(), Some(jane()));
  assert_eq!(s.get_student_by_id("1002").await.unwrap(), None);
}

#[tokio::test]
async fn get_all_respects_limit_and_order() {
  let s = seeded().await;
  let r = s.get_all_students(2).await.unwrap();
  let names: Vec<_> = r.students.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["Adam Smith", "Bob Janeway"]);
  assert_eq!(r.count, 2);
}

#[tokio::test]
async fn numeric_columns_are_read_as_text() {
  let s = store().await;
  s.conn_for_tests()
    .call(|conn| {
      conn.execute(
        "INSERT INTO students (STUDENT_ID, E_NAME, SPRADDR_ZIP) VALUES (555, 'Num Ber', 317)",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let r = s.get_student_by_id("555").await.unwrap().unwrap();
  assert_eq!(r.student_id, "555");
  assert_eq!(r.zip.as_deref(), Some("317"));
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_replaces_existing_rows() {
  let s = seeded().await;
  let mut updated = jane();
  updated.major = None;
  s.upsert_students(vec![updated.clone()]).await.unwrap();

  assert_eq!(s.get_student_by_id("100234").await.unwrap(), Some(updated));
  assert_eq!(s.get_all_students(100).await.unwrap().count, 4);
}

#[tokio::test]
async fn upsert_rejects_blank_ids() {
  let s = store().await;
  let err = s
    .upsert_students(vec![jane(), StudentRecord::new("  ", "Nameless")])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidRecord(_)));
  assert_eq!(s.get_all_students(10).await.unwrap().count, 0);
}

// ─── Soft-fail boundary ──────────────────────────────────────────────────────

#[tokio::test]
async fn directory_over_sqlite() {
  let d = Directory::new(seeded().await);
  assert_eq!(d.search_students("Zainab").await.count, 1);
  assert!(d.get_student_by_id("missing").await.is_none());
}
