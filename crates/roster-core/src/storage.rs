//! Client-local key-value storage.
//!
//! A deliberately small string-to-string interface: history is its only user,
//! and it stores one JSON document under one key.

use std::{
  collections::HashMap,
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Mutex,
};

use crate::{Error, Result};

/// String values addressed by string keys.
pub trait KeyValueStore: Send + Sync {
  /// The value under `key`, or `None` if nothing was ever stored there.
  fn get(&self, key: &str) -> Result<Option<String>>;

  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Delete `key`. Removing a missing key is not an error.
  fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
  fn get(&self, key: &str) -> Result<Option<String>> { (**self).get(key) }

  fn set(&self, key: &str, value: &str) -> Result<()> { (**self).set(key, value) }

  fn remove(&self, key: &str) -> Result<()> { (**self).remove(key) }
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// Process-local storage; useful for testing.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
    self
      .entries
      .lock()
      .map_err(|_| Error::StorageUnavailable("memory storage lock poisoned".into()))
  }
}

impl KeyValueStore for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.lock()?.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self.lock()?.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    self.lock()?.remove(key);
    Ok(())
  }
}

// ─── File-backed ─────────────────────────────────────────────────────────────

/// One file per key (`<dir>/<key>.json`) under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf,
}

impl FileStorage {
  /// Storage rooted at `dir`. The directory is created on first write.
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path_for(&self, key: &str) -> Result<PathBuf> {
    let valid = !key.is_empty()
      && key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
      return Err(Error::InvalidKey(key.to_owned()));
    }
    Ok(self.dir.join(format!("{key}.json")))
  }
}

impl KeyValueStore for FileStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    match fs::read_to_string(self.path_for(key)?) {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let path = self.path_for(key)?;
    fs::create_dir_all(&self.dir)?;
    // Write-then-rename so a crash never leaves a half-written document.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, &path)?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    match fs::remove_file(self.path_for(key)?) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
