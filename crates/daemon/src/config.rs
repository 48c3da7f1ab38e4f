//! Configuration management for the Instadesk state host.
//!
//! Configuration is loaded from TOML files in the following locations (in order):
//! 1. The platform config directory (`%APPDATA%/instadesk/config/config.toml` on Windows)
//! 2. `~/.config/instadesk/config.toml`
//! 3. `./config.toml` (current directory, for development)

use anyhow::{Context, Result};
use directories::ProjectDirs;
use instadesk_core_layout::{GridSize, DEFAULT_COLS, DEFAULT_ROWS};
use instadesk_storage::{
    is_valid_key, storage_key, BackendPreference, DEFAULT_KEY_PREFIX, FAVORITES_COLLECTION,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Largest accepted grid dimension.
pub const MAX_GRID_DIMENSION: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid dimensions.
    pub grid: GridConfig,
    /// Where favorites and history are kept.
    pub storage: StorageConfig,
    /// Behavior configuration.
    pub behavior: BehaviorConfig,
    /// External file picker.
    pub picker: PickerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    #[serde(default = "default_grid_dimension")]
    pub rows: usize,
    #[serde(default = "default_grid_dimension")]
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridConfig {
    pub fn size(&self) -> GridSize {
        GridSize::new(self.rows, self.cols)
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `auto`, `file` or `memory`.
    pub backend: BackendPreference,

    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Namespace for storage keys (`{prefix}.favorites.v1`).
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            data_dir: None,
            key_prefix: default_key_prefix(),
        }
    }
}

/// Behavior-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether assign/unassign empties the selection afterwards.
    #[serde(default = "default_false")]
    pub clear_selection_after_assign: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            clear_selection_after_assign: false,
        }
    }
}

/// External program used as the native file picker.
///
/// The program should print the chosen path on stdout and exit with status
/// 0, or exit non-zero when the user cancels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Program to run. No picker is available when unset.
    pub command: Option<String>,

    /// Arguments; `{title}` is replaced with the dialog title.
    pub args: Vec<String>,
}

fn default_grid_dimension() -> usize {
    DEFAULT_ROWS
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

/// A value that was adjusted by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn clamp_dimension(value: &mut usize, field: &'static str, warnings: &mut Vec<ConfigWarning>) {
    if (1..=MAX_GRID_DIMENSION).contains(value) {
        return;
    }
    let clamped = (*value).clamp(1, MAX_GRID_DIMENSION);
    warnings.push(ConfigWarning::new(
        field,
        format!("{} is outside 1..={}, using {}", value, MAX_GRID_DIMENSION, clamped),
    ));
    *value = clamped;
}

impl Config {
    /// Load configuration from standard locations.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self> {
        let paths = config_paths();

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Clamp out-of-range values in place and report what was changed.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        clamp_dimension(&mut self.grid.rows, "grid.rows", &mut warnings);
        clamp_dimension(&mut self.grid.cols, "grid.cols", &mut warnings);

        if self.storage.key_prefix.trim().is_empty() {
            warnings.push(ConfigWarning::new(
                "storage.key_prefix",
                format!("empty prefix, using {}", DEFAULT_KEY_PREFIX),
            ));
            self.storage.key_prefix = default_key_prefix();
        } else if !is_valid_key(&storage_key(&self.storage.key_prefix, FAVORITES_COLLECTION)) {
            warnings.push(ConfigWarning::new(
                "storage.key_prefix",
                format!(
                    "'{}' may only use letters, digits, '.', '_' and '-', using {}",
                    self.storage.key_prefix, DEFAULT_KEY_PREFIX
                ),
            ));
            self.storage.key_prefix = default_key_prefix();
        }

        let level = self.behavior.log_level.to_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            self.behavior.log_level = level;
        } else {
            warnings.push(ConfigWarning::new(
                "behavior.log_level",
                format!("unknown level '{}', using info", self.behavior.log_level),
            ));
            self.behavior.log_level = default_log_level();
        }

        if self.picker.command.as_deref().is_some_and(|c| c.trim().is_empty()) {
            warnings.push(ConfigWarning::new("picker.command", "empty command ignored"));
            self.picker.command = None;
        }

        warnings
    }
}

/// Parse a log level name; unknown names fall back to `INFO`.
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Get all possible config file paths in priority order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(proj_dirs) = ProjectDirs::from("com", "instadesk", "instadesk") {
        paths.push(proj_dirs.config_dir().join("config.toml"));
    }

    if let Some(home) = dirs_home() {
        paths.push(home.join(".config").join("instadesk").join("config.toml"));
    }

    paths.push(PathBuf::from("config.toml"));

    paths
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
