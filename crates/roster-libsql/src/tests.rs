//! Tests for `LibsqlStore` against a fake pipeline endpoint served by axum.

use std::sync::{Arc, Mutex};

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  routing::post,
};
use serde_json::{Value as JsonValue, json};

use roster_core::store::{Directory, StudentStore};

use crate::{Error, LibsqlConfig, LibsqlStore};

// ─── Fake server ─────────────────────────────────────────────────────────────

#[derive(Clone)]
struct Fake {
  /// Every request body received, with its Authorization header.
  seen:     Arc<Mutex<Vec<(Option<String>, JsonValue)>>>,
  status:   StatusCode,
  response: JsonValue,
}

async fn pipeline(
  State(fake): State<Fake>,
  headers: HeaderMap,
  Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
  let auth = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  fake.seen.lock().unwrap().push((auth, body));
  (fake.status, Json(fake.response.clone()))
}

/// Serve `response` with `status` on an ephemeral port; returns the base URL
/// and the request log.
async fn serve(
  status: StatusCode,
  response: JsonValue,
) -> (String, Arc<Mutex<Vec<(Option<String>, JsonValue)>>>) {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let app = Router::new()
    .route("/v2/pipeline", post(pipeline))
    .with_state(Fake { seen: seen.clone(), status, response });

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  (format!("http://{addr}"), seen)
}

fn store(url: &str, token: Option<&str>) -> LibsqlStore {
  LibsqlStore::new(LibsqlConfig {
    url:        url.to_string(),
    auth_token: token.map(str::to_owned),
  })
  .unwrap()
}

fn ok_rows(rows: JsonValue) -> JsonValue {
  json!({
    "baton": null,
    "base_url": null,
    "results": [
      { "type": "ok", "response": { "type": "execute", "result": {
        "cols": [
          { "name": "STUDENT_ID", "decltype": "TEXT" },
          { "name": "E_NAME", "decltype": "TEXT" },
          { "name": "MAJR1", "decltype": "TEXT" },
          { "name": "SPRADDR_ZIP", "decltype": "TEXT" }
        ],
        "rows": rows,
        "affected_row_count": 0,
        "last_insert_rowid": null
      }}},
      { "type": "ok", "response": { "type": "close" } }
    ]
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_sends_pattern_twice_with_cap_and_bearer() {
  let (url, seen) = serve(
    StatusCode::OK,
    ok_rows(json!([[
      { "type": "text", "value": "100234" },
      { "type": "text", "value": "Jane Doe" },
      { "type": "null" },
      { "type": "integer", "value": "317" }
    ]])),
  )
  .await;

  let r = store(&url, Some("secret-token"))
    .search_students("100234")
    .await
    .unwrap();

  assert_eq!(r.count, 1);
  assert_eq!(r.students[0].student_id, "100234");
  assert_eq!(r.students[0].name, "Jane Doe");
  assert_eq!(r.students[0].major, None);
  assert_eq!(r.students[0].zip.as_deref(), Some("317"));

  let seen = seen.lock().unwrap();
  let (auth, body) = &seen[0];
  assert_eq!(auth.as_deref(), Some("Bearer secret-token"));

  let requests = body["requests"].as_array().unwrap();
  assert_eq!(requests.len(), 2);
  assert_eq!(requests[1]["type"], "close");

  let stmt = &requests[0]["stmt"];
  assert_eq!(requests[0]["type"], "execute");
  let sql = stmt["sql"].as_str().unwrap();
  assert!(sql.contains("STUDENT_ID LIKE ? OR E_NAME LIKE ?"));
  assert!(sql.contains("ORDER BY E_NAME"));
  assert_eq!(stmt["args"], json!([
    { "type": "text", "value": "%100234%" },
    { "type": "text", "value": "%100234%" },
    { "type": "integer", "value": "50" }
  ]));
}

#[tokio::test]
async fn get_by_id_returns_first_row_or_none() {
  let (url, seen) = serve(StatusCode::OK, ok_rows(json!([]))).await;
  let s = store(&url, None);

  assert_eq!(s.get_student_by_id("nope").await.unwrap(), None);

  let seen = seen.lock().unwrap();
  let (auth, body) = &seen[0];
  assert_eq!(*auth, None);
  assert_eq!(
    body["requests"][0]["stmt"]["args"],
    json!([{ "type": "text", "value": "nope" }])
  );
}

#[tokio::test]
async fn get_all_passes_caller_limit() {
  let (url, seen) = serve(StatusCode::OK, ok_rows(json!([]))).await;
  let r = store(&url, None).get_all_students(7).await.unwrap();
  assert_eq!(r.count, 0);

  let seen = seen.lock().unwrap();
  assert_eq!(
    seen[0].1["requests"][0]["stmt"]["args"],
    json!([{ "type": "integer", "value": "7" }])
  );
}

#[tokio::test]
async fn statement_errors_surface_as_statement() {
  let (url, _) = serve(
    StatusCode::OK,
    json!({ "results": [
      { "type": "error", "error": { "message": "no such table: students", "code": "SQLITE_ERROR" } },
      { "type": "error", "error": { "message": "stream closed" } }
    ]}),
  )
  .await;

  let err = store(&url, None).search_students("x").await.unwrap_err();
  match err {
    Error::Statement { message, code } => {
      assert!(message.contains("no such table"));
      assert_eq!(code.as_deref(), Some("SQLITE_ERROR"));
    }
    other => panic!("unexpected error: {other:?}"),
  }
}

#[tokio::test]
async fn http_rejection_surfaces_status() {
  let (url, _) = serve(StatusCode::UNAUTHORIZED, json!({ "error": "bad token" })).await;
  let err = store(&url, Some("wrong")).search_students("x").await.unwrap_err();
  assert!(matches!(err, Error::Status { status: 401, .. }));
}

#[tokio::test]
async fn unreachable_store_degrades_to_empty() {
  // Nothing listens on port 1.
  let d = Directory::new(store("http://127.0.0.1:1", None));
  let r = d.search_students("Jane").await;
  assert_eq!(r.count, 0);
  assert!(r.students.is_empty());
  assert!(d.get_student_by_id("100234").await.is_none());
}
