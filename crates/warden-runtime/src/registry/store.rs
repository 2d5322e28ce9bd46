//! Registry persistence.
//!
//! The registry's recipes are saved as one JSON document:
//!
//! ```text
//! {
//!   "classes": [
//!     { "name": "Delegate", "path": "~/.warden/delegate.json", "method": "Delegate::wakeup" }
//!   ],
//!   "saved_at": "2026-01-01T00:00:00Z"
//! }
//! ```
//!
//! Live instances are never persisted; only the recipes needed to
//! recreate them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use warden_types::ErrorCode;

/// How to create one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecipe {
    /// Registered class name.
    #[serde(rename = "name")]
    pub class_name: String,
    /// Locator handed to `wakeup` (a file path for file-backed classes).
    #[serde(rename = "path", default)]
    pub locator: String,
    /// Factory method id, `"{Class}::wakeup"`.
    #[serde(rename = "method")]
    pub factory_method: String,
}

impl ClassRecipe {
    /// Creates a recipe.
    pub fn new(
        class_name: impl Into<String>,
        locator: impl Into<String>,
        factory_method: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            locator: locator.into(),
            factory_method: factory_method.into(),
        }
    }
}

/// Recipes captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Recipes, sorted by class name.
    pub classes: Vec<ClassRecipe>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

impl RegistrySnapshot {
    /// Creates a snapshot stamped now.
    #[must_use]
    pub fn new(mut classes: Vec<ClassRecipe>) -> Self {
        classes.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        Self {
            classes,
            saved_at: Utc::now(),
        }
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Errors from a [`RegistryStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage directory creation failed.
    #[error("failed to create storage directory: {path}")]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Creates a DirectoryCreation error.
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "REGISTRY_STORE_IO",
            Self::Serialization(_) => "REGISTRY_STORE_SERIALIZATION",
            Self::DirectoryCreation { .. } => "REGISTRY_STORE_DIRECTORY",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Backend that persists registry snapshots.
pub trait RegistryStore: Send + Sync {
    /// Replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot could not be written.
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError>;

    /// Returns the stored snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a stored snapshot could not be read.
    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError>;
}

impl<S: RegistryStore + ?Sized> RegistryStore for Arc<S> {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        (**self).load()
    }
}

/// Snapshot stored in a single JSON file.
///
/// Writes go to a hidden temp file beside the target and are renamed into
/// place.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    /// Creates a store for `path`.
    ///
    /// Nothing is touched on disk until the first [`save`](RegistryStore::save).
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: expand_tilde(path.as_ref()),
        }
    }

    /// Returns the snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for LocalFileStore {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        ensure_parent_dir(&self.path)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(
            path = %self.path.display(),
            classes = snapshot.classes.len(),
            "registry saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)?;
        RegistrySnapshot::from_json(&json).map(Some)
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<RegistrySnapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), StoreError> {
        *self.snapshot.lock() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>, StoreError> {
        Ok(self.snapshot.lock().clone())
    }
}

/// Creates the directory `path` will be written into, if missing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::directory_creation(parent, e))
        }
        _ => Ok(()),
    }
}

/// Writes `contents` to a temp file beside `path`, then renames it over
/// `path`.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
    std::fs::write(&temp_path, contents)?;
    std::fs::rename(&temp_path, path)
}

/// Expands `~` to the user's home directory.
pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(rest) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}

/// Returns the default registry snapshot path.
#[must_use]
pub fn default_registry_path() -> PathBuf {
    crate::config::default_config_dir().join("registry.json")
}
