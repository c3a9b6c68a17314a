//! Application state and key dispatch.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::watch;

use roster_core::{storage::KeyValueStore, store::{DEFAULT_LIST_LIMIT, StudentStore}};
use roster_search::{AuditReporter, SearchOrchestrator, SearchState};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Query input with results, or recent history when there are none.
  Search,
  /// A single student's record.
  Profile,
  /// The caller may not use the application.
  Denied,
}

/// Which list on the search screen receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Results,
  History,
}

// ─── View ─────────────────────────────────────────────────────────────────────

/// Everything the renderer reads. Owns no handles, so `ui` stays free of the
/// store and reporter type parameters.
#[derive(Debug, Clone)]
pub struct View {
  pub denied:         bool,
  pub focus:          Focus,
  /// The text in the search box.
  pub input:          String,
  pub result_cursor:  usize,
  pub history_cursor: usize,
  pub profile_scroll: u16,
  /// Header label for the caller.
  pub caller:         String,
  /// Latest snapshot published by the orchestrator.
  pub search:         SearchState,
}

impl View {
  pub fn screen(&self) -> Screen {
    if self.denied {
      Screen::Denied
    } else if self.search.selected.is_some() {
      Screen::Profile
    } else {
      Screen::Search
    }
  }

  /// History takes the results pane while there are no results to show.
  pub fn history_visible(&self) -> bool {
    self.search.results.is_empty() && !self.search.history.is_empty()
  }

  fn clamp_cursors(&mut self) {
    let results = self.search.results.students.len();
    self.result_cursor = self.result_cursor.min(results.saturating_sub(1));
    let history = self.search.history.len();
    self.history_cursor = self.history_cursor.min(history.saturating_sub(1));
    if !self.history_visible() {
      self.focus = Focus::Results;
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S, R, K> {
  pub view:     View,
  orchestrator: SearchOrchestrator<S, R, K>,
  updates:      watch::Receiver<SearchState>,
}

impl<S, R, K> App<S, R, K>
where
  S: StudentStore + 'static,
  R: AuditReporter,
  K: KeyValueStore,
{
  pub fn new(orchestrator: SearchOrchestrator<S, R, K>, denied: bool, caller: String) -> Self {
    let updates = orchestrator.subscribe();
    Self {
      view: View {
        denied,
        focus: Focus::Results,
        input: String::new(),
        result_cursor: 0,
        history_cursor: 0,
        profile_scroll: 0,
        caller,
        search: orchestrator.state(),
      },
      orchestrator,
      updates,
    }
  }

  /// Pull the latest orchestrator state into the view.
  pub fn sync(&mut self) {
    if self.updates.has_changed().unwrap_or(false) {
      self.view.search = self.updates.borrow_and_update().clone();
      self.view.clamp_cursors();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
      return false;
    }

    let keep_going = match self.view.screen() {
      Screen::Denied => false,
      Screen::Profile => {
        self.handle_profile_key(key);
        true
      }
      Screen::Search => {
        match self.view.focus {
          Focus::Results => self.handle_search_key(key, ctrl),
          Focus::History => self.handle_history_key(key),
        }
        true
      }
    };

    self.sync();
    keep_going
  }

  fn handle_search_key(&mut self, key: KeyEvent, ctrl: bool) {
    match key.code {
      KeyCode::Char('b') if ctrl => {
        if self.view.input.trim().is_empty() {
          self.view.result_cursor = 0;
          self.orchestrator.browse(DEFAULT_LIST_LIMIT);
        }
      }
      KeyCode::Char(_) if ctrl => {}
      KeyCode::Char(c) => {
        self.view.input.push(c);
        self.query_changed();
      }
      KeyCode::Backspace => {
        if self.view.input.pop().is_some() {
          self.query_changed();
        }
      }
      KeyCode::Esc => {
        if !self.view.input.is_empty() {
          self.view.input.clear();
          self.query_changed();
        }
      }

      KeyCode::Down => {
        let len = self.view.search.results.students.len();
        if self.view.result_cursor + 1 < len {
          self.view.result_cursor += 1;
        }
      }
      KeyCode::Up => {
        self.view.result_cursor = self.view.result_cursor.saturating_sub(1);
      }

      KeyCode::Enter => {
        let picked = self
          .view
          .search
          .results
          .students
          .get(self.view.result_cursor)
          .cloned();
        if let Some(student) = picked {
          self.view.profile_scroll = 0;
          self.orchestrator.on_select(student);
        }
      }

      KeyCode::Tab => {
        if self.view.history_visible() {
          self.view.focus = Focus::History;
        }
      }

      _ => {}
    }
  }

  fn handle_history_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down => {
        if self.view.history_cursor + 1 < self.view.search.history.len() {
          self.view.history_cursor += 1;
        }
      }
      KeyCode::Up => {
        self.view.history_cursor = self.view.history_cursor.saturating_sub(1);
      }

      KeyCode::Enter => {
        let picked = self.view.search.history.get(self.view.history_cursor).cloned();
        if let Some(item) = picked {
          self.view.profile_scroll = 0;
          self.view.focus = Focus::Results;
          self.orchestrator.open_history(&item);
        }
      }

      KeyCode::Delete | KeyCode::Char('d') => {
        let id = self
          .view
          .search
          .history
          .get(self.view.history_cursor)
          .map(|item| item.student.student_id.clone());
        if let Some(id) = id {
          self.orchestrator.remove_from_history(&id);
        }
      }
      KeyCode::Char('C') => {
        self.orchestrator.clear_history();
        self.view.focus = Focus::Results;
      }

      KeyCode::Tab | KeyCode::Esc => self.view.focus = Focus::Results,

      _ => {}
    }
  }

  fn handle_profile_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => self.orchestrator.close_profile(),
      KeyCode::Down => self.view.profile_scroll = self.view.profile_scroll.saturating_add(1),
      KeyCode::Up => self.view.profile_scroll = self.view.profile_scroll.saturating_sub(1),
      _ => {}
    }
  }

  fn query_changed(&mut self) {
    self.view.result_cursor = 0;
    self.orchestrator.on_input(self.view.input.clone());
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use roster_core::{
    access::{AccessGate, AuthConfig, SEARCH_DENIED_MESSAGE},
    history::HistoryStore,
    identity::CallerIdentity,
    storage::MemoryStorage,
    store::Directory,
    student::StudentRecord,
  };
  use roster_search::LogReporter;
  use roster_store_sqlite::SqliteStore;

  use super::*;

  type TestApp = App<SqliteStore, LogReporter, MemoryStorage>;

  async fn build_app(user_id: i64) -> TestApp {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .upsert_students(vec![
        StudentRecord::new("100234", "Jane Doe"),
        StudentRecord::new("200111", "John Roe"),
      ])
      .await
      .unwrap();

    let gate = AccessGate::new(Arc::new(AuthConfig::new([100], 42)));
    let identity = Some(CallerIdentity::new(user_id));
    let denied = !gate.can_open_app(identity.as_ref());
    let orchestrator = SearchOrchestrator::new(
      gate,
      Directory::new(store),
      Arc::new(LogReporter),
      HistoryStore::new(MemoryStorage::new()),
      identity,
    )
    .with_debounce(Duration::ZERO);
    App::new(orchestrator, denied, format!("#{user_id}"))
  }

  fn press(app: &mut TestApp, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
  }

  fn type_text(app: &mut TestApp, text: &str) {
    for c in text.chars() {
      press(app, KeyCode::Char(c));
    }
  }

  async fn settle(app: &mut TestApp) {
    app.orchestrator.settle().await;
    app.sync();
  }

  #[tokio::test]
  async fn typing_searches_and_enter_opens_profile() {
    let mut app = build_app(100).await;
    type_text(&mut app, "Jane");
    assert_eq!(app.view.input, "Jane");
    settle(&mut app).await;

    assert_eq!(app.view.search.results.count, 1);
    assert!(press(&mut app, KeyCode::Enter));
    assert_eq!(app.view.screen(), Screen::Profile);
    assert_eq!(app.view.search.history.len(), 1);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.view.screen(), Screen::Search);
  }

  #[tokio::test]
  async fn history_is_navigable_when_results_are_empty() {
    let mut app = build_app(100).await;
    type_text(&mut app, "Jane");
    settle(&mut app).await;
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Esc);

    // Clearing the query empties the results and reveals history.
    press(&mut app, KeyCode::Esc);
    settle(&mut app).await;
    assert!(app.view.history_visible());

    press(&mut app, KeyCode::Tab);
    assert_eq!(app.view.focus, Focus::History);

    press(&mut app, KeyCode::Char('d'));
    assert!(app.view.search.history.is_empty());
    assert_eq!(app.view.focus, Focus::Results);
  }

  #[tokio::test]
  async fn ctrl_b_browses_when_query_is_empty() {
    let mut app = build_app(100).await;
    app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL));
    settle(&mut app).await;

    assert_eq!(app.view.input, "");
    assert_eq!(app.view.search.results.count, 2);
    assert_eq!(app.view.search.results.students[0].name, "Jane Doe");
  }

  #[tokio::test]
  async fn denied_caller_can_only_quit() {
    let mut app = build_app(999).await;
    assert_eq!(app.view.screen(), Screen::Denied);
    assert!(!press(&mut app, KeyCode::Char('x')));
  }

  #[tokio::test]
  async fn admin_opens_app_but_stranger_search_is_denied() {
    // The app-open gate and the search gate use the same allow-list.
    let mut app = build_app(42).await;
    assert_eq!(app.view.screen(), Screen::Search);
    type_text(&mut app, "Jane");
    settle(&mut app).await;
    assert_eq!(app.view.search.error, None);

    let mut app = build_app(999).await;
    app.view.denied = false;
    type_text(&mut app, "Jane");
    settle(&mut app).await;
    assert_eq!(app.view.search.error.as_deref(), Some(SEARCH_DENIED_MESSAGE));
    assert!(app.view.search.results.is_empty());
  }

  #[tokio::test]
  async fn ctrl_c_quits_from_anywhere() {
    let mut app = build_app(100).await;
    assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
  }
}
