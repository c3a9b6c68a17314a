//! The caller identity handed over by the host runtime.

use serde::{Deserialize, Serialize};

/// Who is at the keyboard, as reported by the host. Read-only to the core.
///
/// An identity that the host could not supply at all is modelled as
/// `Option<CallerIdentity>::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
  pub id:         i64,
  #[serde(default)]
  pub username:   Option<String>,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name:  Option<String>,
}

impl CallerIdentity {
  pub fn new(id: i64) -> Self {
    Self { id, username: None, first_name: None, last_name: None }
  }

  /// First and last name joined by a space; `None` when both are blank.
  pub fn full_name(&self) -> Option<String> {
    let full = format!(
      "{} {}",
      self.first_name.as_deref().unwrap_or_default(),
      self.last_name.as_deref().unwrap_or_default(),
    );
    let full = full.trim();
    (!full.is_empty()).then(|| full.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_name_trims_missing_parts() {
    let mut who = CallerIdentity::new(1);
    assert_eq!(who.full_name(), None);

    who.first_name = Some("Ada".into());
    assert_eq!(who.full_name().as_deref(), Some("Ada"));

    who.last_name = Some("Lovelace".into());
    assert_eq!(who.full_name().as_deref(), Some("Ada Lovelace"));
  }
}
