//! Error type for `roster-search`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport failure. The request URL is stripped before wrapping because
  /// it embeds the bot token.
  #[error("http error: {0}")]
  Http(reqwest::Error),

  #[error("bot api responded {status}")]
  Status { status: u16 },

  #[error("bot api rejected message ({code:?}): {description}")]
  Rejected {
    code:        Option<i64>,
    description: String,
  },
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self { Self::Http(e.without_url()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
