//! Raw string storage backends.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Which kind of backend a store ended up using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Survives restarts.
    File,
    /// Lives only as long as the process.
    Memory,
}

/// Synchronous string-key to string-value storage.
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Raw value under `key`, `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}
