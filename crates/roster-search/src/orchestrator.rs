//! [`SearchOrchestrator`] — debounced, gated search over a [`Directory`].
//!
//! Every keystroke cancels the pending debounce task and schedules a new one,
//! so only the most recent text ever reaches the gate. A settled query goes to
//! exactly one of the store or the [`AuditReporter`], never both.
//!
//! Each dispatch bumps a generation counter. A task whose generation is no
//! longer current may still be running on another worker, so every write it
//! makes to the published state is dropped.

use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use roster_core::{
  access::{AccessGate, SEARCH_DENIED_MESSAGE},
  history::{HistoryItem, HistoryStore},
  identity::CallerIdentity,
  storage::KeyValueStore,
  store::{Directory, StudentStore},
  student::{SearchResult, StudentRecord},
};

use crate::audit::AuditReporter;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shown when the store could not be reached.
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed. Please try again.";

/// Query label used in audit reports for a denied "browse all".
pub const BROWSE_ALL_LABEL: &str = "(browse all)";

// ─── State ───────────────────────────────────────────────────────────────────

/// Where the current query is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
  #[default]
  Idle,
  Debouncing,
  Unauthorized,
  Querying,
  Success,
  Failed,
}

/// Everything a presentation layer needs to render the search screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
  pub query:    String,
  pub phase:    SearchPhase,
  pub results:  SearchResult,
  pub loading:  bool,
  /// User-facing message: access denied or search failed.
  pub error:    Option<String>,
  /// The record whose profile is open.
  pub selected: Option<StudentRecord>,
  pub history:  Vec<HistoryItem>,
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// The parts shared with spawned lookup tasks.
struct Pipeline<S, R> {
  gate:       AccessGate,
  directory:  Directory<S>,
  reporter:   Arc<R>,
  identity:   Option<CallerIdentity>,
  state:      watch::Sender<SearchState>,
  generation: AtomicU64,
}

/// Clears the loading flag however the lookup ends, including when the task
/// is aborted mid-flight. A superseded lookup leaves the flag alone.
struct LoadingGuard<'a, S, R> {
  pipeline:   &'a Pipeline<S, R>,
  generation: u64,
}

impl<S, R> Drop for LoadingGuard<'_, S, R> {
  fn drop(&mut self) { self.pipeline.publish(self.generation, |s| s.loading = false); }
}

impl<S, R> Pipeline<S, R> {
  /// Start a new generation, making every task already spawned stale. Runs
  /// under the state lock so no stale write can land after it.
  fn supersede(&self, update: impl FnOnce(&mut SearchState)) -> u64 {
    let mut generation = 0;
    self.state.send_modify(|s| {
      generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
      s.loading = false;
      update(s);
    });
    generation
  }

  /// Apply `update` only if `generation` is still the current one.
  fn publish(&self, generation: u64, update: impl FnOnce(&mut SearchState)) {
    self.state.send_if_modified(|s| {
      if self.generation.load(Ordering::SeqCst) != generation {
        return false;
      }
      update(s);
      true
    });
  }
}

impl<S, R> Pipeline<S, R>
where
  S: StudentStore + 'static,
  R: AuditReporter,
{
  /// Gate check shared by search and browse. On denial the state is reset,
  /// a report is dispatched in the background and `false` is returned.
  fn admit(&self, generation: u64, attempted: &str) -> bool {
    if self.gate.can_search(self.identity.as_ref()) {
      return true;
    }

    self.publish(generation, |s| {
      s.phase = SearchPhase::Unauthorized;
      s.results = SearchResult::default();
      s.error = Some(SEARCH_DENIED_MESSAGE.to_string());
      s.loading = false;
    });

    let reporter = Arc::clone(&self.reporter);
    let identity = self.identity.clone();
    let query = attempted.to_string();
    tokio::spawn(async move { reporter.report_unauthorized_search(identity, query).await });
    false
  }

  fn begin_query(&self, generation: u64) -> LoadingGuard<'_, S, R> {
    self.publish(generation, |s| {
      s.phase = SearchPhase::Querying;
      s.error = None;
      s.loading = true;
    });
    LoadingGuard { pipeline: self, generation }
  }

  fn finish<E: std::fmt::Display>(
    &self,
    generation: u64,
    outcome: Result<SearchResult, E>,
    what: &str,
  ) {
    match outcome {
      Ok(results) => {
        debug!(what, count = results.count, "lookup finished");
        self.publish(generation, |s| {
          s.phase = SearchPhase::Success;
          s.results = results;
        });
      }
      Err(e) => {
        warn!(error = %e, what, "lookup failed");
        self.publish(generation, |s| {
          s.phase = SearchPhase::Failed;
          s.results = SearchResult::default();
          s.error = Some(SEARCH_FAILED_MESSAGE.to_string());
        });
      }
    }
  }

  async fn search(&self, generation: u64, query: String) {
    if query.trim().is_empty() {
      self.publish(generation, |s| {
        s.phase = SearchPhase::Idle;
        s.results = SearchResult::default();
        s.error = None;
        s.loading = false;
      });
      return;
    }

    if !self.admit(generation, &query) {
      return;
    }

    let _loading = self.begin_query(generation);
    let outcome = self.directory.try_search(&query).await;
    self.finish(generation, outcome, &query);
  }

  async fn browse(&self, generation: u64, limit: usize) {
    if !self.admit(generation, BROWSE_ALL_LABEL) {
      return;
    }

    let _loading = self.begin_query(generation);
    let outcome = self.directory.try_get_all_students(limit).await;
    self.finish(generation, outcome, BROWSE_ALL_LABEL);
  }

  /// Replace the open profile with a fresh copy, if it is still open.
  async fn refresh_selected(&self, student_id: String) {
    let Some(fresh) = self.directory.get_student_by_id(&student_id).await else {
      return;
    };
    self.state.send_if_modified(|s| match &s.selected {
      Some(open) if open.student_id == student_id && *open != fresh => {
        s.selected = Some(fresh);
        true
      }
      _ => false,
    });
  }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Owns the debounce handle and the history store for one caller.
///
/// Must be used from within a tokio runtime. Dropping it cancels any pending
/// lookup.
pub struct SearchOrchestrator<S, R, K> {
  pipeline: Arc<Pipeline<S, R>>,
  history:  HistoryStore<K>,
  delay:    Duration,
  pending:  Option<JoinHandle<()>>,
  refresh:  Option<JoinHandle<()>>,
}

impl<S, R, K> SearchOrchestrator<S, R, K>
where
  S: StudentStore + 'static,
  R: AuditReporter,
  K: KeyValueStore,
{
  pub fn new(
    gate: AccessGate,
    directory: Directory<S>,
    reporter: Arc<R>,
    history: HistoryStore<K>,
    identity: Option<CallerIdentity>,
  ) -> Self {
    let initial = SearchState { history: history.list(), ..SearchState::default() };
    let (state, _) = watch::channel(initial);
    Self {
      pipeline: Arc::new(Pipeline {
        gate,
        directory,
        reporter,
        identity,
        state,
        generation: AtomicU64::new(0),
      }),
      history,
      delay: DEFAULT_DEBOUNCE,
      pending: None,
      refresh: None,
    }
  }

  pub fn with_debounce(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn subscribe(&self) -> watch::Receiver<SearchState> { self.pipeline.state.subscribe() }

  /// A snapshot of the current state.
  pub fn state(&self) -> SearchState { self.pipeline.state.borrow().clone() }

  fn cancel_pending(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  /// Record the latest query text and restart the debounce timer.
  pub fn on_input(&mut self, text: impl Into<String>) {
    let query = text.into();
    self.cancel_pending();
    let generation = self.pipeline.supersede(|s| {
      s.query = query.clone();
      s.phase = SearchPhase::Debouncing;
    });

    let pipeline = Arc::clone(&self.pipeline);
    let delay = self.delay;
    self.pending = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      pipeline.search(generation, query).await;
    }));
  }

  /// List the first `limit` records, subject to the same gate as a search.
  pub fn browse(&mut self, limit: usize) {
    self.cancel_pending();
    let generation = self.pipeline.supersede(|_| {});
    let pipeline = Arc::clone(&self.pipeline);
    self.pending = Some(tokio::spawn(async move { pipeline.browse(generation, limit).await }));
  }

  /// Open `student`'s profile and record the view in history.
  pub fn on_select(&mut self, student: StudentRecord) {
    if let Some(handle) = self.refresh.take() {
      handle.abort();
    }
    self.history.add(student.clone());
    let history = self.history.list();
    self.pipeline.state.send_modify(|s| {
      s.selected = Some(student);
      s.history = history;
    });
  }

  /// Open a history entry: show the snapshot at once, then swap in the
  /// current record from the store if it can be fetched. A caller the gate
  /// denies only ever sees the snapshot.
  pub fn open_history(&mut self, item: &HistoryItem) {
    self.on_select(item.student.clone());
    if !self.pipeline.gate.can_search(self.pipeline.identity.as_ref()) {
      debug!(student_id = %item.student.student_id, "skipping refresh for denied caller");
      return;
    }

    let pipeline = Arc::clone(&self.pipeline);
    let student_id = item.student.student_id.clone();
    self.refresh = Some(tokio::spawn(async move {
      pipeline.refresh_selected(student_id).await
    }));
  }

  pub fn close_profile(&mut self) {
    if let Some(handle) = self.refresh.take() {
      handle.abort();
    }
    self.pipeline.state.send_modify(|s| s.selected = None);
  }

  pub fn remove_from_history(&mut self, student_id: &str) {
    self.history.remove(student_id);
    self.reload_history();
  }

  pub fn clear_history(&mut self) {
    self.history.clear();
    self.reload_history();
  }

  fn reload_history(&self) {
    let history = self.history.list();
    self.pipeline.state.send_modify(|s| s.history = history);
  }

  /// Wait for the scheduled lookup and any profile refresh to finish.
  pub async fn settle(&mut self) {
    for handle in [self.pending.take(), self.refresh.take()].into_iter().flatten() {
      // An aborted task is simply done.
      if let Err(e) = handle.await
        && e.is_panic()
      {
        std::panic::resume_unwind(e.into_panic());
      }
    }
  }
}

impl<S, R, K> Drop for SearchOrchestrator<S, R, K> {
  fn drop(&mut self) {
    for handle in [self.pending.take(), self.refresh.take()].into_iter().flatten() {
      handle.abort();
    }
  }
}
