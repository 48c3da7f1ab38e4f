//! Favorite shortcuts: launchable applications and URLs.
//!
//! The list keeps insertion order. It is loaded once from the store and
//! written back after every mutation; a failed write leaves the in-memory
//! list authoritative for the rest of the session.

use crate::clock::{Clock, SystemClock};
use crate::icons::seed_emoji;
use crate::id::generate_id;
use instadesk_storage::{storage_key, KeyValueStore, FAVORITES_COLLECTION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// What a favorite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    App,
    Url,
}

/// A stored favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub kind: FavoriteKind,
    /// Friendly name shown in the UI.
    pub title: String,
    /// Full executable/shortcut path or URL.
    pub path_or_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// Input for [`FavoritesService::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub kind: FavoriteKind,
    pub title: String,
    pub path_or_url: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewFavorite {
    pub fn new(kind: FavoriteKind, title: impl Into<String>, path_or_url: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            path_or_url: path_or_url.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Partial update merged into an existing favorite. `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FavoritePatch {
    pub kind: Option<FavoriteKind>,
    pub title: Option<String>,
    pub path_or_url: Option<String>,
    pub icon: Option<String>,
}

impl FavoritePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn apply(&self, favorite: &mut Favorite) {
        if let Some(kind) = self.kind {
            favorite.kind = kind;
        }
        if let Some(title) = &self.title {
            favorite.title = title.clone();
        }
        if let Some(target) = &self.path_or_url {
            favorite.path_or_url = target.clone();
        }
        if let Some(icon) = &self.icon {
            favorite.icon = Some(icon.clone());
        }
    }
}

/// Favorites catalog.
pub struct FavoritesService {
    store: KeyValueStore,
    key: String,
    items: Vec<Favorite>,
    clock: Arc<dyn Clock>,
}

impl FavoritesService {
    /// Load favorites stored under `"{prefix}.favorites.v1"`.
    pub fn new(store: KeyValueStore, key_prefix: &str) -> Self {
        Self::with_clock(store, key_prefix, Arc::new(SystemClock))
    }

    pub fn with_clock(store: KeyValueStore, key_prefix: &str, clock: Arc<dyn Clock>) -> Self {
        let key = storage_key(key_prefix, FAVORITES_COLLECTION);
        let items = store.get(&key, Vec::new());
        debug!("Loaded {} favorites from {}", items.len(), key);
        Self {
            store,
            key,
            items,
            clock,
        }
    }

    /// Storage key this catalog persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Re-read the list from the store.
    pub fn reload(&mut self) {
        self.items = self.store.get(&self.key, Vec::new());
    }

    /// All favorites in insertion order.
    pub fn list(&self) -> &[Favorite] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Favorite> {
        self.items.iter().find(|f| f.id == id)
    }

    fn persist(&self) {
        self.store.set(&self.key, &self.items);
    }

    /// Create a favorite. Title and target are trimmed; a missing icon is
    /// derived from the title.
    pub fn add(&mut self, input: NewFavorite) -> Favorite {
        let icon = input
            .icon
            .unwrap_or_else(|| seed_emoji(&input.title).to_string());
        let favorite = Favorite {
            id: generate_id("fav"),
            kind: input.kind,
            title: input.title.trim().to_string(),
            path_or_url: input.path_or_url.trim().to_string(),
            icon: Some(icon),
            created_at: self.clock.now_millis(),
        };
        self.items.push(favorite.clone());
        self.persist();
        info!("Added favorite {} ({})", favorite.title, favorite.id);
        favorite
    }

    /// Merge `patch` into the favorite with `id`. `None` if there is none.
    pub fn update(&mut self, id: &str, patch: &FavoritePatch) -> Option<Favorite> {
        let favorite = self.items.iter_mut().find(|f| f.id == id)?;
        patch.apply(favorite);
        let updated = favorite.clone();
        self.persist();
        Some(updated)
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Option<Favorite> {
        self.update(id, &FavoritePatch::title(title))
    }

    /// Delete by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|f| f.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.persist();
            info!("Removed favorite {}", id);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }
}
