//! Loading and saving of the component registry and the lock state.
//!
//! A [`Store`] is built once per invocation with explicit file paths and
//! handed by reference to whatever needs to read or persist state. Nothing
//! here caches: every `load_*` call reads the file again.

use crate::error::{LifecycleError, Result};
use crate::lock::LockState;
use crate::paths;
use crate::registry::Registry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Read and parse the JSON document at `path`.
///
/// A missing file yields `default` when one is supplied and
/// [`LifecycleError::NotFound`] otherwise. Any other read or parse failure is a
/// [`LifecycleError::Config`].
pub fn load<T: DeserializeOwned>(path: &Path, default: Option<T>) -> Result<T> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return default.ok_or_else(|| LifecycleError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(LifecycleError::config(path, e)),
    };
    serde_json::from_str(&data).map_err(|e| LifecycleError::config(path, e))
}

/// Serialize `value` with 2-space indentation and replace the file at `path`.
pub fn save<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let data = crate::io::to_pretty_json(value).map_err(|e| LifecycleError::config(path, e))?;
    crate::io::atomic_write(path, data.as_bytes()).map_err(|e| LifecycleError::config(path, e))
}

#[derive(Debug, Clone)]
pub struct Store {
    registry_path: PathBuf,
    lock_path: PathBuf,
}

impl Store {
    pub fn new(registry_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            registry_path: registry_path.into(),
            lock_path: lock_path.into(),
        }
    }

    /// Store for `components.json` and `components-lock.json` inside `root`.
    pub fn at_root(root: &Path) -> Self {
        Self::new(paths::registry_path(root), paths::lock_path(root))
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Load and validate the registry. A missing registry is an error.
    pub fn load_registry(&self) -> Result<Registry> {
        let registry: Registry = load(&self.registry_path, None)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Load the lock state, treating a missing file as "nothing initialized".
    pub fn load_lock(&self) -> Result<LockState> {
        load(&self.lock_path, Some(LockState::default()))
    }

    pub fn save_lock(&self, lock: &LockState) -> Result<()> {
        save(lock, &self.lock_path)?;
        tracing::info!(
            path = %self.lock_path.display(),
            initialized = lock.initialized.len(),
            "lock state saved"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
