//! Recently used application paths.
//!
//! At most one record exists per path, compared case-insensitively. Adding a
//! known path refreshes the existing record instead of inserting a new one.

use crate::clock::{Clock, SystemClock};
use crate::id::generate_id;
use instadesk_storage::{storage_key, KeyValueStore, HISTORY_COLLECTION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A stored history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub title: String,
    /// Full executable, shortcut or batch path.
    pub path: String,
    /// Last time the record was added or refreshed, Unix milliseconds.
    pub created_at: i64,
}

/// Input for [`HistoryService::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryItem {
    pub title: String,
    pub path: String,
}

impl NewHistoryItem {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }
}

/// Outcome of [`upsert_by_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted(HistoryItem),
    Updated(HistoryItem),
}

impl Upsert {
    pub fn item(&self) -> &HistoryItem {
        match self {
            Upsert::Inserted(item) | Upsert::Updated(item) => item,
        }
    }

    pub fn into_item(self) -> HistoryItem {
        match self {
            Upsert::Inserted(item) | Upsert::Updated(item) => item,
        }
    }
}

/// Case-insensitive path equality used for de-duplication.
pub fn paths_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Insert or refresh a record keyed by path.
///
/// Title and path are trimmed. On a match the existing record keeps its id,
/// takes the new timestamp, and takes the new title only if it is non-empty.
/// A new record with an empty title is titled by its path.
pub fn upsert_by_path(
    items: &mut Vec<HistoryItem>,
    input: &NewHistoryItem,
    now: i64,
    new_id: impl FnOnce() -> String,
) -> Upsert {
    let title = input.title.trim();
    let path = input.path.trim();

    if let Some(existing) = items.iter_mut().find(|item| paths_match(&item.path, path)) {
        if !title.is_empty() {
            existing.title = title.to_string();
        }
        existing.created_at = now;
        return Upsert::Updated(existing.clone());
    }

    let item = HistoryItem {
        id: new_id(),
        title: if title.is_empty() { path } else { title }.to_string(),
        path: path.to_string(),
        created_at: now,
    };
    items.push(item.clone());
    Upsert::Inserted(item)
}

/// Application history catalog.
pub struct HistoryService {
    store: KeyValueStore,
    key: String,
    items: Vec<HistoryItem>,
    clock: Arc<dyn Clock>,
}

impl HistoryService {
    /// Load history stored under `"{prefix}.history.v1"`.
    pub fn new(store: KeyValueStore, key_prefix: &str) -> Self {
        Self::with_clock(store, key_prefix, Arc::new(SystemClock))
    }

    pub fn with_clock(store: KeyValueStore, key_prefix: &str, clock: Arc<dyn Clock>) -> Self {
        let key = storage_key(key_prefix, HISTORY_COLLECTION);
        let items = store.get(&key, Vec::new());
        debug!("Loaded {} history items from {}", items.len(), key);
        Self {
            store,
            key,
            items,
            clock,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn reload(&mut self) {
        self.items = self.store.get(&self.key, Vec::new());
    }

    /// All records, newest first. Equal timestamps keep stored order.
    pub fn list(&self) -> Vec<HistoryItem> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn persist(&self) {
        self.store.set(&self.key, &self.items);
    }

    /// Add or refresh a record (see [`upsert_by_path`]).
    pub fn add(&mut self, input: NewHistoryItem) -> HistoryItem {
        let now = self.clock.now_millis();
        let outcome = upsert_by_path(&mut self.items, &input, now, || generate_id("hist"));
        self.persist();
        match &outcome {
            Upsert::Inserted(item) => info!("Added {} to history ({})", item.path, item.id),
            Upsert::Updated(item) => debug!("Refreshed history entry {}", item.id),
        }
        outcome.into_item()
    }

    /// Delete by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Delete every record.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
        info!("History cleared");
    }
}
