//! Reporting of denied search attempts.
//!
//! Reports are best-effort: delivery failures are logged and swallowed, and
//! nothing is retried. The orchestrator runs each report as a detached task,
//! so a slow bot API never holds up the UI.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use roster_core::{access::AuthConfig, identity::CallerIdentity};

use crate::{Error, Result};

pub const DEFAULT_BOT_API_BASE: &str = "https://api.telegram.org";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A sink for unauthorized-search notifications.
pub trait AuditReporter: Send + Sync + 'static {
  /// Report that `identity` tried to search for `query`. Never fails.
  fn report_unauthorized_search(
    &self,
    identity: Option<CallerIdentity>,
    query: String,
  ) -> impl Future<Output = ()> + Send + '_;
}

// ─── Report text ─────────────────────────────────────────────────────────────

/// Escape the characters Telegram's HTML parse mode treats as markup.
fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// The human-readable report body sent to the administrator.
///
/// Missing identity details fall back to `Unknown` / `None`. Caller-supplied
/// text is HTML-escaped.
pub fn format_report(
  identity: Option<&CallerIdentity>,
  query: &str,
  at: DateTime<Local>,
) -> String {
  let user_id = identity
    .map(|who| who.id)
    .filter(|id| *id != 0)
    .map_or_else(|| "Unknown".to_string(), |id| id.to_string());
  let username = identity
    .and_then(|who| who.username.as_deref())
    .filter(|u| !u.is_empty())
    .map_or_else(|| "None".to_string(), escape_html);
  let name = identity
    .and_then(CallerIdentity::full_name)
    .map_or_else(|| "Unknown".to_string(), |n| escape_html(&n));

  format!(
    "🚨 Unauthorized Search Attempt\n\n\
     User ID: {user_id}\n\
     Username: @{username}\n\
     Name: {name}\n\
     Search Query: \"{query}\"\n\
     Time: {time}",
    query = escape_html(query),
    time = at.format("%Y-%m-%d %H:%M:%S"),
  )
}

// ─── Log-only reporter ───────────────────────────────────────────────────────

/// Writes reports to the local log only. Used when no bot credential is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct LogReporter;

impl AuditReporter for LogReporter {
  async fn report_unauthorized_search(&self, identity: Option<CallerIdentity>, query: String) {
    let report = format_report(identity.as_ref(), &query, Local::now());
    warn!(report = %report, "unauthorized search attempt (no bot configured)");
  }
}

// ─── Telegram reporter ───────────────────────────────────────────────────────

/// Bot credential and endpoint.
#[derive(Clone)]
pub struct TelegramConfig {
  pub bot_token: String,
  /// Defaults to [`DEFAULT_BOT_API_BASE`]; overridable for testing.
  pub api_base:  String,
}

impl std::fmt::Debug for TelegramConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TelegramConfig")
      .field("bot_token", &"<redacted>")
      .field("api_base", &self.api_base)
      .finish()
  }
}

#[derive(Serialize)]
struct SendMessage<'a> {
  chat_id:    i64,
  text:       &'a str,
  parse_mode: &'a str,
}

#[derive(Deserialize)]
struct BotResponse {
  ok:          bool,
  #[serde(default)]
  error_code:  Option<i64>,
  #[serde(default)]
  description: Option<String>,
}

/// Delivers reports to the administrator's chat through the bot API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramReporter {
  client: Client,
  config: TelegramConfig,
  auth:   Arc<AuthConfig>,
}

impl TelegramReporter {
  pub fn new(config: TelegramConfig, auth: Arc<AuthConfig>) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config, auth })
  }

  fn endpoint(&self) -> String {
    format!(
      "{}/bot{}/sendMessage",
      self.config.api_base.trim_end_matches('/'),
      self.config.bot_token
    )
  }

  /// Send one report, surfacing every failure.
  pub async fn try_report(&self, identity: Option<&CallerIdentity>, query: &str) -> Result<()> {
    let text = format_report(identity, query, Local::now());
    let resp = self
      .client
      .post(self.endpoint())
      .json(&SendMessage { chat_id: self.auth.admin_id, text: &text, parse_mode: "HTML" })
      .send()
      .await?;

    let status = resp.status();
    match resp.json::<BotResponse>().await {
      Ok(body) if body.ok => Ok(()),
      Ok(body) => Err(Error::Rejected {
        code:        body.error_code,
        description: body.description.unwrap_or_default(),
      }),
      Err(_) if status.is_success() => Ok(()),
      Err(_) => Err(Error::Status { status: status.as_u16() }),
    }
  }
}

impl AuditReporter for TelegramReporter {
  async fn report_unauthorized_search(&self, identity: Option<CallerIdentity>, query: String) {
    let user_id = identity.as_ref().map(|who| who.id);
    match self.try_report(identity.as_ref(), &query).await {
      Ok(()) => info!(?user_id, query, "unauthorized search reported"),
      Err(e) => warn!(error = %e, ?user_id, query, "failed to report unauthorized search"),
    }
  }
}
