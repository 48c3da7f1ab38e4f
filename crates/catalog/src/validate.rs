//! Checks applied to user-entered favorites and applications before they
//! reach a catalog. The catalogs themselves accept any strings.

use crate::favorites::{FavoriteKind, NewFavorite};
use crate::history::NewHistoryItem;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Title used when nothing better can be inferred from a path.
pub const FALLBACK_APP_TITLE: &str = "Custom App";

/// Extensions accepted without confirmation.
pub const LAUNCHABLE_EXTENSIONS: [&str; 4] = ["exe", "lnk", "bat", "cmd"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a title.")]
    MissingTitle,

    #[error("Enter a valid URL starting with http:// or https://")]
    InvalidUrl,

    #[error("Enter an application path (e.g., C:\\Program Files\\App\\app.exe)")]
    MissingPath,

    #[error("Path does not end with .exe/.lnk/.bat/.cmd: {0}")]
    UnrecognizedExtension(String),
}

impl InputError {
    /// Whether the user may override this error by confirming.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, InputError::UnrecognizedExtension(_))
    }
}

fn launchable_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.(exe|lnk|bat|cmd)$").ok())
        .as_ref()
}

fn web_url_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^https?://").ok()).as_ref()
}

/// Path ends in a launchable extension (case-insensitive).
pub fn is_launchable_path(path: &str) -> bool {
    launchable_re().is_some_and(|re| re.is_match(path.trim()))
}

/// Starts with `http://` or `https://` (case-insensitive).
pub fn is_web_url(url: &str) -> bool {
    web_url_re().is_some_and(|re| re.is_match(url.trim()))
}

/// Friendly title from a picked path: the file name without a launchable
/// extension.
pub fn infer_title_from_path(path: &str) -> String {
    let normalized = path.trim().replace('\\', "/");
    let base = normalized.rsplit('/').next().unwrap_or_default();
    let stripped = match launchable_re() {
        Some(re) => re.replace(base, "").into_owned(),
        None => base.to_string(),
    };
    let title = stripped.trim();
    if title.is_empty() {
        FALLBACK_APP_TITLE.to_string()
    } else {
        title.to_string()
    }
}

fn check_app_path(path: &str, confirmed: bool) -> Result<(), InputError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(InputError::MissingPath);
    }
    if !confirmed && !is_launchable_path(path) {
        return Err(InputError::UnrecognizedExtension(path.to_string()));
    }
    Ok(())
}

/// Validate a favorite. `confirmed` waives the extension check.
pub fn validate_favorite(input: &NewFavorite, confirmed: bool) -> Result<(), InputError> {
    if input.title.trim().is_empty() {
        return Err(InputError::MissingTitle);
    }
    match input.kind {
        FavoriteKind::Url if !is_web_url(&input.path_or_url) => Err(InputError::InvalidUrl),
        FavoriteKind::Url => Ok(()),
        FavoriteKind::App => check_app_path(&input.path_or_url, confirmed),
    }
}

/// Validate a manually entered application. `confirmed` waives the
/// extension check.
pub fn validate_history(input: &NewHistoryItem, confirmed: bool) -> Result<(), InputError> {
    if input.title.trim().is_empty() {
        return Err(InputError::MissingTitle);
    }
    check_app_path(&input.path, confirmed)
}
