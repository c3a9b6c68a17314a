//! Picks the audit sink at startup.

use roster_core::identity::CallerIdentity;
use roster_search::{AuditReporter, LogReporter, TelegramReporter};

/// The bot reporter when a token is configured, the log otherwise.
pub enum Reporter {
  Telegram(TelegramReporter),
  Log(LogReporter),
}

impl AuditReporter for Reporter {
  async fn report_unauthorized_search(&self, identity: Option<CallerIdentity>, query: String) {
    match self {
      Self::Telegram(r) => r.report_unauthorized_search(identity, query).await,
      Self::Log(r) => r.report_unauthorized_search(identity, query).await,
    }
  }
}
