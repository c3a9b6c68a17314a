//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("invalid storage key: {0:?}")]
  InvalidKey(String),

  #[error("storage io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
