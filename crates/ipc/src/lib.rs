//! Instadesk IPC Protocol
//!
//! Shared types for communication between a presentation layer and the
//! state host. Each message is one JSON object on its own line.

use instadesk_catalog::{Favorite, FavoriteKind, FavoritePatch, HistoryItem};
use instadesk_core_layout::{
    AppId, Modifiers, Monitor, Preset, PresetId, Rect, UrlBuilderDraft, UrlOpenMode,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Maximum size of a single message line in bytes.
pub const MAX_IPC_MESSAGE_SIZE: usize = 64 * 1024;

/// Response line used when a response cannot be serialized.
const SERIALIZATION_FAILURE_LINE: &str =
    "{\"status\":\"error\",\"message\":\"Internal serialization error\"}";

/// Commands sent from the UI to the state host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcCommand {
    // Grid selection
    /// Pointer down on a cell.
    BeginDrag {
        row: usize,
        col: usize,
        /// Modifiers held at pointer down; any set flag makes the gesture additive.
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer entered a cell.
    UpdateDrag { row: usize, col: usize },
    /// Pointer up.
    EndDrag,
    /// Flip a single cell's selection.
    ToggleCell { row: usize, col: usize },
    /// Empty the selection (also the Escape handler).
    ClearSelection,

    // Assignment
    /// Arm (or disarm) the application used by `assign_selected`.
    SetSelectedApp {
        #[serde(default)]
        app: Option<AppId>,
    },
    AssignSelected,
    UnassignSelected,
    ClearGrid,
    CopyGrid,
    PasteGrid,
    /// Query selection, assignments and drag state.
    QueryGrid,

    // Monitors
    SetCurrentMonitor { monitor_id: String },
    SetPendingPreset {
        monitor_id: String,
        #[serde(default)]
        preset: Option<PresetId>,
    },
    QueryMonitors,

    // Favorites
    ListFavorites,
    AddFavorite {
        kind: FavoriteKind,
        title: String,
        path_or_url: String,
        #[serde(default)]
        icon: Option<String>,
        /// Accept a path without a launchable extension.
        #[serde(default)]
        force: bool,
    },
    UpdateFavorite { id: String, patch: FavoritePatch },
    RemoveFavorite { id: String },
    ClearFavorites,

    // History
    ListHistory,
    AddHistory {
        title: String,
        path: String,
        #[serde(default)]
        force: bool,
    },
    /// Ask the file picker for an application path and record it in history.
    BrowseApp {
        #[serde(default)]
        title: Option<String>,
    },
    RemoveHistory { id: String },
    ClearHistory,

    // URL builder
    SetUrlBrowser {
        #[serde(default)]
        browser: Option<String>,
    },
    SetUrlOpenMode { mode: UrlOpenMode },
    AddBrowser { name: String },
    AddTabGroup,
    SetTabTitle { group_id: String, title: String },
    SetUrlLine {
        group_id: String,
        index: usize,
        value: String,
    },
    AddUrlLine { group_id: String },
    ResetUrlBuilder,
    QueryUrlBuilder,

    /// Stop the state host.
    Stop,
}

/// Responses from the state host to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully.
    Ok,
    /// Command failed with an error.
    Error { message: String },
    /// Nothing failed, but the user should be told something.
    Info { message: String },
    /// Input was rejected until the user confirms it (resend with `force`).
    NeedsConfirmation { message: String },
    /// Grid state query response.
    GridState {
        rows: usize,
        cols: usize,
        /// Selected cell keys (`"row,col"`), sorted.
        selection: Vec<String>,
        /// Every cell key of the grid mapped to its application.
        assignments: BTreeMap<String, Option<AppId>>,
        selected_app: Option<AppId>,
        dragging: bool,
        has_clipboard: bool,
    },
    /// Monitor board query response.
    Monitors {
        monitors: Vec<Monitor>,
        presets: Vec<Preset>,
        current: String,
        pending: BTreeMap<String, Option<PresetId>>,
        /// Bounding box of all monitors in preview coordinates.
        extent: Option<Rect>,
    },
    Favorites { items: Vec<Favorite> },
    /// A single favorite; `None` when the id was not found.
    Favorite { item: Option<Favorite> },
    /// History, newest first.
    History { items: Vec<HistoryItem> },
    HistoryItem { item: HistoryItem },
    UrlBuilder {
        draft: UrlBuilderDraft,
        browsers: Vec<String>,
    },
}

impl IpcResponse {
    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Create an informational response.
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn needs_confirmation(message: impl Into<String>) -> Self {
        Self::NeedsConfirmation {
            message: message.into(),
        }
    }
}

/// Errors decoding a command line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Message too large: {0} bytes (max {max})", max = MAX_IPC_MESSAGE_SIZE)]
    TooLarge(usize),

    #[error("Invalid command: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse one command line (surrounding whitespace ignored).
pub fn decode_command(line: &str) -> Result<IpcCommand, ProtocolError> {
    let line = line.trim();
    if line.len() > MAX_IPC_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(line.len()));
    }
    Ok(serde_json::from_str(line)?)
}

/// Serialize a response as one newline-terminated line.
pub fn encode_response(response: &IpcResponse) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json + "\n",
        Err(_) => format!("{}\n", SERIALIZATION_FAILURE_LINE),
    }
}
