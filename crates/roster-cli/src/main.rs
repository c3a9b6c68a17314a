//! `roster` — terminal front end for the student directory.
//!
//! # Usage
//!
//! ```text
//! roster --user-id 100 --username jdoe
//! roster --config /etc/roster.toml
//! roster import students.json
//! ```
//!
//! The caller identity stands in for what a mini-app host would hand over.
//! Logs go to `<data_dir>/roster.log` while the terminal UI is running.

mod app;
mod import;
mod reporter;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reporter::Reporter;
use roster_core::{
  access::AccessGate,
  history::HistoryStore,
  identity::CallerIdentity,
  storage::FileStorage,
  store::{Directory, StudentStore},
};
use roster_libsql::LibsqlStore;
use roster_search::{LogReporter, SearchOrchestrator, TelegramReporter};
use roster_store_sqlite::SqliteStore;
use settings::{Backend, Overrides, Settings};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Authorized student directory search")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// Caller's Telegram user id.
  #[arg(long)]
  user_id: Option<i64>,

  #[arg(long)]
  username: Option<String>,

  #[arg(long)]
  first_name: Option<String>,

  #[arg(long)]
  last_name: Option<String>,

  /// Store location: `libsql://…`, `http(s)://…` or a SQLite file.
  #[arg(long)]
  db_url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load a JSON array of student records into the local SQLite store.
  Import {
    /// JSON file to read.
    file: PathBuf,
  },
}

impl Args {
  fn overrides(&self) -> Overrides {
    Overrides {
      user_id:    self.user_id,
      username:   self.username.clone(),
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      db_url:     self.db_url.clone(),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = settings::load(&args.config, &args.overrides())?;

  match &args.command {
    Some(Command::Import { file }) => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
      import::run(&settings, file).await
    }
    None => run_tui(settings).await,
  }
}

fn env_filter() -> EnvFilter {
  EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy()
}

/// Send logs to `path`; the terminal belongs to the UI.
fn init_file_logging(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Everything except the store, which decides the orchestrator's type.
struct Session {
  gate:     AccessGate,
  reporter: Arc<Reporter>,
  history:  HistoryStore<FileStorage>,
  identity: Option<CallerIdentity>,
  debounce: Duration,
}

async fn run_tui(settings: Settings) -> Result<()> {
  let data_dir = settings.data_dir();
  std::fs::create_dir_all(&data_dir)
    .with_context(|| format!("creating data dir {}", data_dir.display()))?;
  init_file_logging(&data_dir.join("roster.log"))?;

  let auth = Arc::new(settings.auth());
  let reporter = match settings.telegram() {
    Some(bot) => Reporter::Telegram(
      TelegramReporter::new(bot, Arc::clone(&auth)).context("building bot client")?,
    ),
    None => {
      warn!("no bot_token configured; unauthorized searches will only be logged");
      Reporter::Log(LogReporter)
    }
  };

  let session = Session {
    gate:     AccessGate::new(auth),
    reporter: Arc::new(reporter),
    history:  HistoryStore::new(FileStorage::new(&data_dir)),
    identity: settings.user.clone(),
    debounce: settings.debounce(),
  };

  match settings.backend() {
    Backend::Remote(cfg) => {
      info!(url = %cfg.url, "using remote libsql store");
      let store = LibsqlStore::new(cfg).context("building libsql client")?;
      run(Directory::new(store), session).await
    }
    Backend::Local(path) => {
      info!(path = %path.display(), "using local sqlite store");
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      run(Directory::new(store), session).await
    }
  }
}

async fn run<S: StudentStore + 'static>(directory: Directory<S>, session: Session) -> Result<()> {
  let identity = session.identity;
  let denied = !session.gate.can_open_app(identity.as_ref());
  if denied {
    warn!(user_id = ?identity.as_ref().map(|who| who.id), "caller may not open the app");
  } else {
    info!(user_id = ?identity.as_ref().map(|who| who.id), "session started");
  }

  let caller = caller_label(identity.as_ref());
  let orchestrator = SearchOrchestrator::new(
    session.gate,
    directory,
    session.reporter,
    session.history,
    identity,
  )
  .with_debounce(session.debounce);
  let mut app = App::new(orchestrator, denied, caller);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

fn caller_label(identity: Option<&CallerIdentity>) -> String {
  match identity {
    None => "(no identity)".to_string(),
    Some(who) => match (&who.username, who.full_name()) {
      (Some(username), _) => format!("@{username}"),
      (None, Some(name)) => name,
      (None, None) => format!("#{}", who.id),
    },
  }
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<S, R, K>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S, R, K>,
) -> Result<()>
where
  S: StudentStore + 'static,
  R: roster_search::AuditReporter,
  K: roster_core::storage::KeyValueStore,
{
  loop {
    app.sync();
    terminal
      .draw(|f| ui::draw(f, &app.view))
      .context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}
