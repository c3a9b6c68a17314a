//! Layered configuration: an optional TOML file, then `ROSTER_*` environment
//! variables, then command-line flags.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use roster_core::{access::AuthConfig, identity::CallerIdentity};
use roster_libsql::LibsqlConfig;
use roster_search::{TelegramConfig, audit::DEFAULT_BOT_API_BASE, orchestrator::DEFAULT_DEBOUNCE};

/// Flag values that take precedence over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
  pub user_id:    Option<i64>,
  pub username:   Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub db_url:     Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct Settings {
  /// Telegram user ids allowed to search.
  #[serde(default)]
  pub allowed_ids:  Vec<i64>,
  /// Receives audit reports; implicitly allowed.
  #[serde(default)]
  pub admin_id:     i64,
  #[serde(default)]
  pub bot_token:    Option<String>,
  #[serde(default = "default_bot_api_base")]
  pub bot_api_base: String,
  /// `libsql://…`, `http(s)://…`, or a SQLite file path.
  #[serde(default = "default_db_url")]
  pub db_url:       String,
  #[serde(default)]
  pub db_token:     Option<String>,
  #[serde(default = "default_data_dir")]
  pub data_dir:     PathBuf,
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms:  u64,
  /// The caller, as the host would report it.
  #[serde(default)]
  pub user:         Option<CallerIdentity>,
}

fn default_bot_api_base() -> String { DEFAULT_BOT_API_BASE.to_string() }

fn default_db_url() -> String { "roster.db".to_string() }

fn default_data_dir() -> PathBuf { PathBuf::from("~/.local/share/roster") }

fn default_debounce_ms() -> u64 { DEFAULT_DEBOUNCE.as_millis() as u64 }

/// Where student records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
  Remote(LibsqlConfig),
  Local(PathBuf),
}

/// Read settings from `path` (if it exists) and the environment, then apply
/// `overrides`.
pub fn load(path: &Path, overrides: &Overrides) -> anyhow::Result<Settings> {
  let builder = Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("ROSTER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_ids"),
    );
  from_builder(builder, overrides)
}

fn from_builder(
  builder: ConfigBuilder<DefaultState>,
  overrides: &Overrides,
) -> anyhow::Result<Settings> {
  let settings = builder
    .set_override_option("user.id", overrides.user_id)?
    .set_override_option("user.username", overrides.username.clone())?
    .set_override_option("user.first_name", overrides.first_name.clone())?
    .set_override_option("user.last_name", overrides.last_name.clone())?
    .set_override_option("db_url", overrides.db_url.clone())?
    .build()
    .context("failed to read configuration")?;

  settings
    .try_deserialize()
    .context("invalid configuration (a [user] table needs an id)")
}

impl Settings {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig::new(self.allowed_ids.iter().copied(), self.admin_id)
  }

  /// Bot settings, or `None` when no token is configured.
  pub fn telegram(&self) -> Option<TelegramConfig> {
    let token = self.bot_token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    Some(TelegramConfig {
      bot_token: token.to_string(),
      api_base:  self.bot_api_base.clone(),
    })
  }

  pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }

  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }

  pub fn backend(&self) -> Backend {
    let url = self.db_url.trim();
    if ["libsql://", "https://", "http://"]
      .iter()
      .any(|scheme| url.starts_with(scheme))
    {
      Backend::Remote(LibsqlConfig {
        url:        url.to_string(),
        auth_token: self.db_token.clone(),
      })
    } else {
      let path = url.strip_prefix("file:").unwrap_or(url);
      Backend::Local(expand_tilde(Path::new(path)))
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
