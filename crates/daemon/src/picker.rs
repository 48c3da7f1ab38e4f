//! File picker used by the "browse for application" flow.
//!
//! The picker is chosen once at startup. When no native picker exists the
//! UI falls back to manual path entry.

use crate::config::PickerConfig;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use thiserror::Error;
use tracing::{debug, info, warn};

/// File types offered by the application dialog.
pub const APP_FILTER: [&str; 4] = ["*.exe", "*.lnk", "*.bat", "*.cmd"];

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Native picker unavailable")]
    Unavailable,

    #[error("Picker failed: {0}")]
    Failed(String),
}

/// Outcome of a pick: `None` when the user cancelled.
pub type PickFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<String>, PickerError>> + Send + 'a>>;

/// What the dialog should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub title: String,
    pub filters: Vec<String>,
}

impl PickRequest {
    pub fn application(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            filters: APP_FILTER.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Asks the user for a file-system path.
///
/// Dropping the returned future abandons the request.
pub trait PathPicker: Send + Sync {
    fn is_available(&self) -> bool;

    fn pick<'a>(&'a self, request: &'a PickRequest) -> PickFuture<'a>;
}

/// Picker for environments without a native dialog.
#[derive(Debug, Default)]
pub struct UnavailablePicker;

impl PathPicker for UnavailablePicker {
    fn is_available(&self) -> bool {
        false
    }

    fn pick<'a>(&'a self, _request: &'a PickRequest) -> PickFuture<'a> {
        Box::pin(async { Err(PickerError::Unavailable) })
    }
}

/// Runs an external dialog program and reads the chosen path from stdout.
///
/// `{title}` and `{filter}` in the arguments are substituted per request.
/// A non-zero exit status or empty output means the user cancelled.
#[derive(Debug, Clone)]
pub struct CommandPicker {
    program: String,
    args: Vec<String>,
}

impl CommandPicker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn expand_args(&self, request: &PickRequest) -> Vec<String> {
        let filter = request.filters.join(" ");
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{title}", &request.title)
                    .replace("{filter}", &filter)
            })
            .collect()
    }

    async fn run(&self, request: &PickRequest) -> Result<Option<String>, PickerError> {
        let args = self.expand_args(request);
        debug!("Running picker: {} {:?}", self.program, args);

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                warn!("Failed to start picker {}: {}", self.program, e);
                PickerError::Unavailable
            })?;

        if !output.status.success() {
            debug!("Picker exited with {}", output.status);
            return Ok(None);
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| PickerError::Failed(format!("picker output is not UTF-8: {}", e)))?;
        let path = stdout.lines().next().unwrap_or_default().trim();
        if path.is_empty() {
            Ok(None)
        } else {
            Ok(Some(path.to_string()))
        }
    }
}

impl PathPicker for CommandPicker {
    fn is_available(&self) -> bool {
        true
    }

    fn pick<'a>(&'a self, request: &'a PickRequest) -> PickFuture<'a> {
        Box::pin(self.run(request))
    }
}

/// Choose the picker for this process.
pub fn picker_from_config(config: &PickerConfig) -> Box<dyn PathPicker> {
    match config.command.as_deref().map(str::trim) {
        Some(program) if !program.is_empty() => {
            info!("Using external file picker: {}", program);
            Box::new(CommandPicker::new(program, config.args.clone()))
        }
        _ => {
            info!("No file picker configured; paths must be typed manually");
            Box::new(UnavailablePicker)
        }
    }
}
