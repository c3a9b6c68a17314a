//! Static allow-list access control.
//!
//! [`AuthConfig`] is built once at startup and shared by the [`AccessGate`]
//! and the audit reporter. Decisions are stateless and re-evaluated on every
//! call.

use std::{collections::BTreeSet, sync::Arc};

use serde::Deserialize;

use crate::identity::CallerIdentity;

/// Shown when the caller may not open the application at all.
pub const APP_DENIED_MESSAGE: &str =
  "Access Denied: You are not authorized to use this application.";

/// Shown when the caller may not run a search. Deliberately says nothing about
/// which ids would be accepted.
pub const SEARCH_DENIED_MESSAGE: &str =
  "Access Denied: You are not authorized to perform searches.";

// ─── Configuration ───────────────────────────────────────────────────────────

/// The allow-list and the administrative recipient of audit reports.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
  /// User ids permitted to open the app and search.
  #[serde(default)]
  pub allowed_ids: BTreeSet<i64>,
  /// Recipient of unauthorized-search reports.
  #[serde(default)]
  pub admin_id:    i64,
}

impl AuthConfig {
  /// Build a config whose allow-list is `allowed_ids` plus the admin.
  ///
  /// Non-positive ids are never valid user ids and are dropped.
  pub fn new(allowed_ids: impl IntoIterator<Item = i64>, admin_id: i64) -> Self {
    let allowed_ids = allowed_ids
      .into_iter()
      .chain(std::iter::once(admin_id))
      .filter(|id| *id > 0)
      .collect();
    Self { allowed_ids, admin_id }
  }

  /// `true` iff `id` is a positive member of the allow-list.
  pub fn allows(&self, id: i64) -> bool {
    id > 0 && self.allowed_ids.contains(&id)
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Pure authorization predicate over [`AuthConfig`].
///
/// Cloning is cheap — the config is reference-counted.
#[derive(Debug, Clone)]
pub struct AccessGate {
  config: Arc<AuthConfig>,
}

impl AccessGate {
  pub fn new(config: Arc<AuthConfig>) -> Self { Self { config } }

  pub fn config(&self) -> &AuthConfig { &self.config }

  fn is_authorized(&self, identity: Option<&CallerIdentity>) -> bool {
    identity.is_some_and(|who| self.config.allows(who.id))
  }

  /// Whether `identity` may open the application.
  pub fn can_open_app(&self, identity: Option<&CallerIdentity>) -> bool {
    self.is_authorized(identity)
  }

  /// Whether `identity` may run a search. Currently the same rule as
  /// [`Self::can_open_app`]; kept separate so the two can diverge.
  pub fn can_search(&self, identity: Option<&CallerIdentity>) -> bool {
    self.is_authorized(identity)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gate(allowed: &[i64], admin: i64) -> AccessGate {
    AccessGate::new(Arc::new(AuthConfig::new(allowed.iter().copied(), admin)))
  }

  #[test]
  fn members_are_allowed() {
    let g = gate(&[111, 222], 333);
    for id in [111, 222, 333] {
      let who = CallerIdentity::new(id);
      assert!(g.can_open_app(Some(&who)), "id {id}");
      assert!(g.can_search(Some(&who)), "id {id}");
    }
  }

  #[test]
  fn non_members_are_denied() {
    let g = gate(&[111, 222], 333);
    for id in [999, -111, 0, 112] {
      let who = CallerIdentity::new(id);
      assert!(!g.can_open_app(Some(&who)), "id {id}");
      assert!(!g.can_search(Some(&who)), "id {id}");
    }
  }

  #[test]
  fn absent_identity_is_denied() {
    let g = gate(&[111], 111);
    assert!(!g.can_open_app(None));
    assert!(!g.can_search(None));
  }

  #[test]
  fn empty_allow_list_denies_everyone() {
    let g = AccessGate::new(Arc::new(AuthConfig::default()));
    assert!(!g.can_search(Some(&CallerIdentity::new(1))));

    // An unset admin (zero) does not sneak into the allow-list.
    let g = gate(&[], 0);
    assert!(g.config().allowed_ids.is_empty());
    assert!(!g.can_search(Some(&CallerIdentity::new(0))));
  }

  #[test]
  fn large_allow_list() {
    let g = gate(&(1..=10_000).collect::<Vec<_>>(), 1);
    assert!(g.can_search(Some(&CallerIdentity::new(9_999))));
    assert!(!g.can_search(Some(&CallerIdentity::new(10_001))));
  }
}
