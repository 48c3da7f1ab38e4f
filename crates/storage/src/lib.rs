//! Instadesk Storage
//!
//! String-keyed JSON storage with graceful degradation:
//! - Values are serialized as JSON and stored under namespaced keys
//!   such as `insta.favorites.v1`
//! - A durable file backend is preferred; when no data directory is usable
//!   the store falls back to an in-process map
//! - Read and write failures never reach the caller; reads return the
//!   supplied fallback and writes are logged and dropped

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use backend::{BackendKind, StorageBackend};
pub use error::StorageError;
pub use file::{is_valid_key, FileBackend};
pub use memory::MemoryBackend;

/// Collection name of the favorites list.
pub const FAVORITES_COLLECTION: &str = "favorites";
/// Collection name of the application history list.
pub const HISTORY_COLLECTION: &str = "history";
/// Default key namespace.
pub const DEFAULT_KEY_PREFIX: &str = "insta";

/// Namespaced, versioned storage key: `"{prefix}.{collection}.v1"`.
///
/// A schema change bumps the suffix instead of migrating old data.
pub fn storage_key(prefix: &str, collection: &str) -> String {
    format!("{}.{}.v1", prefix, collection)
}

/// Which backend the caller would like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// Durable if a data directory is usable, memory otherwise.
    #[default]
    Auto,
    /// Durable; falls back to memory with a warning.
    File,
    /// Never touch the disk.
    Memory,
}

/// Platform data directory for durable storage.
pub fn default_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "instadesk", "instadesk").map(|dirs| dirs.data_dir().to_path_buf())
}

/// JSON key-value store over a swappable backend.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

impl KeyValueStore {
    /// Wrap an explicit backend.
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Process-lifetime store.
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Select a backend once, at startup.
    ///
    /// `data_dir` overrides the platform data directory.
    pub fn open(preference: BackendPreference, data_dir: Option<PathBuf>) -> Self {
        if preference == BackendPreference::Memory {
            info!("Using in-memory storage (requested)");
            return Self::in_memory();
        }

        let Some(dir) = data_dir.or_else(default_data_dir) else {
            Self::log_fallback(preference, "no data directory available");
            return Self::in_memory();
        };

        match FileBackend::open(&dir) {
            Ok(backend) => {
                info!("Using durable storage at {}", dir.display());
                Self::with_backend(Arc::new(backend))
            }
            Err(e) => {
                Self::log_fallback(preference, &e.to_string());
                Self::in_memory()
            }
        }
    }

    fn log_fallback(preference: BackendPreference, reason: &str) {
        if preference == BackendPreference::File {
            warn!("Durable storage requested but unavailable ({}); data will not survive restart", reason);
        } else {
            info!("Durable storage unavailable ({}); using in-memory storage", reason);
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Parsed value under `key`, or `fallback` if absent, empty, unparsable,
    /// or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return fallback,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unparsable value under {}: {}", key, e);
                fallback
            }
        }
    }

    /// Serialize `value` and store it under `key`. Failures are logged only.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            warn!("Failed to write {}: {}", key, e);
        }
    }

    fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_item(key, &raw)?;
        debug!("Stored {} ({} bytes)", key, raw.len());
        Ok(())
    }

    /// Delete `key`. Failures are logged only.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            warn!("Failed to remove {}: {}", key, e);
        }
    }
}
