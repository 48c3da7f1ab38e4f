//! Instadesk Catalog
//!
//! Persistent user catalogs backed by a [`KeyValueStore`]:
//! - Favorites: applications and URLs in insertion order
//! - History: recently used applications, one record per path, newest first
//!
//! Both catalogs keep an in-memory copy for the session and write through
//! to the store on every change.
//!
//! [`KeyValueStore`]: instadesk_storage::KeyValueStore

pub mod clock;
pub mod favorites;
pub mod history;
pub mod icons;
pub mod id;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use favorites::{Favorite, FavoriteKind, FavoritePatch, FavoritesService, NewFavorite};
pub use history::{paths_match, upsert_by_path, HistoryItem, HistoryService, NewHistoryItem, Upsert};
pub use icons::{seed_emoji, ICON_PALETTE};
pub use id::generate_id;
pub use validate::{
    infer_title_from_path, is_launchable_path, is_web_url, validate_favorite, validate_history,
    InputError, FALLBACK_APP_TITLE,
};
