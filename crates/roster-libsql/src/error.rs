//! Error type for `roster-libsql`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("store responded {status}: {body}")]
  Status { status: u16, body: String },

  /// The statement reached the database and was rejected.
  #[error("statement failed: {message}")]
  Statement {
    message: String,
    code:    Option<String>,
  },

  #[error("unexpected pipeline response: {0}")]
  Protocol(String),

  #[error("row decode error: {0}")]
  Decode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
