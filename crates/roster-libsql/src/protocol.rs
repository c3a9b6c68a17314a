//! Wire types for the libSQL HTTP pipeline API.
//!
//! Only the subset needed for one-shot reads is modelled: `execute` and
//! `close` requests, and `execute` results with column names and rows.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use roster_core::student::StudentRecord;

use crate::{Error, Result};

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single SQL value. Integers travel as strings to survive JSON's 53-bit
/// number range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Value {
  Null,
  Integer { value: String },
  Float { value: f64 },
  Text { value: String },
  Blob { base64: String },
}

impl Value {
  pub fn text(s: impl Into<String>) -> Self { Self::Text { value: s.into() } }

  pub fn integer(i: i64) -> Self { Self::Integer { value: i.to_string() } }

  /// Lenient text view used when decoding student columns.
  fn into_json(self) -> serde_json::Value {
    match self {
      Value::Null => serde_json::Value::Null,
      Value::Integer { value } | Value::Text { value } => value.into(),
      Value::Float { value } => value.to_string().into(),
      Value::Blob { base64 } => base64.into(),
    }
  }
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PipelineRequest<'a> {
  pub requests: Vec<StreamRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamRequest<'a> {
  Execute { stmt: Stmt<'a> },
  Close,
}

#[derive(Debug, Serialize)]
pub struct Stmt<'a> {
  pub sql:  &'a str,
  pub args: Vec<Value>,
}

impl<'a> PipelineRequest<'a> {
  /// One statement on a fresh stream, closed straight after.
  pub fn single(sql: &'a str, args: Vec<Value>) -> Self {
    Self {
      requests: vec![
        StreamRequest::Execute { stmt: Stmt { sql, args } },
        StreamRequest::Close,
      ],
    }
  }
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PipelineResponse {
  pub results: Vec<StreamResult>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResult {
  Ok { response: StreamResponse },
  Error { error: StreamError },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResponse {
  Execute { result: StmtResult },
  Close,
}

#[derive(Debug, Deserialize)]
pub struct StreamError {
  pub message: String,
  #[serde(default)]
  pub code:    Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StmtResult {
  pub cols: Vec<Col>,
  pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub struct Col {
  #[serde(default)]
  pub name: Option<String>,
}

impl PipelineResponse {
  /// The result of the first (and only) `execute` in the pipeline.
  pub fn into_execute_result(self) -> Result<StmtResult> {
    let first = self
      .results
      .into_iter()
      .next()
      .ok_or_else(|| Error::Protocol("empty results".into()))?;

    match first {
      StreamResult::Ok { response: StreamResponse::Execute { result } } => Ok(result),
      StreamResult::Ok { response: StreamResponse::Close } => {
        Err(Error::Protocol("close before execute".into()))
      }
      StreamResult::Error { error } => Err(Error::Statement {
        message: error.message,
        code:    error.code,
      }),
    }
  }
}

impl StmtResult {
  /// Decode every row into a [`StudentRecord`] by column name.
  pub fn into_students(self) -> Result<Vec<StudentRecord>> {
    let names: Vec<String> = self
      .cols
      .into_iter()
      .enumerate()
      .map(|(i, c)| c.name.unwrap_or_else(|| format!("col{i}")))
      .collect();

    self
      .rows
      .into_iter()
      .map(|row| {
        let object: Map<String, serde_json::Value> = names
          .iter()
          .cloned()
          .zip(row.into_iter().map(Value::into_json))
          .collect();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
      })
      .collect()
  }
}
