//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Rejected on import: every record needs a non-empty id and name.
  #[error("invalid student record: {0}")]
  InvalidRecord(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
