//! [`LibsqlStore`] — the remote implementation of [`StudentStore`].

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use roster_core::{
  store::{SEARCH_LIMIT, StudentStore, like_pattern, sql},
  student::{SearchResult, StudentRecord},
};

use crate::{
  Error, Result,
  protocol::{PipelineRequest, PipelineResponse, Value},
};

/// Connection settings for a hosted libSQL database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibsqlConfig {
  /// `libsql://`, `https://` or `http://` database URL.
  pub url:        String,
  /// Database access token, sent as a bearer token when set.
  pub auth_token: Option<String>,
}

/// Student directory served by a remote libSQL database.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct LibsqlStore {
  client:   Client,
  endpoint: String,
  token:    Option<String>,
}

impl LibsqlStore {
  pub fn new(config: LibsqlConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self {
      client,
      endpoint: pipeline_url(&config.url),
      token: config.auth_token.filter(|t| !t.is_empty()),
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  /// Run one statement and decode its rows as students.
  async fn execute(&self, sql: &str, args: Vec<Value>) -> Result<Vec<StudentRecord>> {
    let mut req = self
      .client
      .post(&self.endpoint)
      .json(&PipelineRequest::single(sql, args));
    if let Some(token) = &self.token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let pipeline: PipelineResponse = resp.json().await?;
    let students = pipeline.into_execute_result()?.into_students()?;
    debug!(rows = students.len(), "libsql statement returned");
    Ok(students)
  }
}

/// `libsql://host` → `https://host/v2/pipeline`.
fn pipeline_url(url: &str) -> String {
  let url = url.trim().trim_end_matches('/');
  let base = match url.strip_prefix("libsql://") {
    Some(rest) => format!("https://{rest}"),
    None => url.to_string(),
  };
  format!("{base}/v2/pipeline")
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for LibsqlStore {
  type Error = Error;

  async fn search_students(&self, query: &str) -> Result<SearchResult> {
    let pattern = like_pattern(query);
    let rows = self
      .execute(&sql::search(), vec![
        Value::text(pattern.clone()),
        Value::text(pattern),
        Value::integer(SEARCH_LIMIT as i64),
      ])
      .await?;
    Ok(rows.into())
  }

  async fn get_student_by_id(&self, student_id: &str) -> Result<Option<StudentRecord>> {
    let rows = self
      .execute(&sql::by_id(), vec![Value::text(student_id)])
      .await?;
    Ok(rows.into_iter().next())
  }

  async fn get_all_students(&self, limit: usize) -> Result<SearchResult> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = self.execute(&sql::all(), vec![Value::integer(limit)]).await?;
    Ok(rows.into())
  }
}
