//! Application state container.
//!
//! One `AppState` owns everything the UI reads and mutates during a session.
//! It is constructed explicitly and passed to the command loop, so tests can
//! build as many independent instances as they need.

use crate::config::Config;
use crate::picker::{PathPicker, PickFuture, PickRequest, PickerError};
use instadesk_catalog::{
    infer_title_from_path, validate_favorite, validate_history, Clock, FavoritesService,
    HistoryService, InputError, NewFavorite, NewHistoryItem, SystemClock,
};
use instadesk_core_layout::{AppId, GridSelectionEngine, MonitorBoard, UrlBuilder};
use instadesk_ipc::{IpcCommand, IpcResponse};
use instadesk_storage::KeyValueStore;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tracing::{debug, info, warn};

/// Shown when no native picker can be used.
pub const PICKER_UNAVAILABLE_MESSAGE: &str = "Native picker unavailable. Type the path manually.";
/// Shown when the user dismissed the picker.
pub const NO_FILE_SELECTED_MESSAGE: &str = "No file selected.";
/// Immediate answer to `browse_app`; the result follows on its own line.
pub const PICKER_OPENED_MESSAGE: &str = "Waiting for a file selection.";
/// Answer to `browse_app` while a dialog is still open.
pub const PICKER_BUSY_MESSAGE: &str = "A file picker is already open.";
/// Picker title when the caller supplies none.
const DEFAULT_PICKER_TITLE: &str = "Select an application";

/// A picker dialog opened by `browse_app` that has not answered yet.
///
/// Resolves to a [`BrowseOutcome`] for [`AppState::finish_browse`].
/// Dropping it abandons the dialog.
pub struct PendingBrowse {
    title: Option<String>,
    pick: PickFuture<'static>,
}

impl Future for PendingBrowse {
    type Output = BrowseOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<BrowseOutcome> {
        let result = ready!(self.pick.as_mut().poll(cx));
        Poll::Ready(BrowseOutcome {
            title: self.title.take(),
            result,
        })
    }
}

/// Picker answer paired with the title given to `browse_app`.
#[derive(Debug)]
pub struct BrowseOutcome {
    title: Option<String>,
    result: Result<Option<String>, PickerError>,
}

pub struct AppState {
    engine: GridSelectionEngine,
    /// Armed application for `assign_selected`.
    selected_app: Option<AppId>,
    monitors: MonitorBoard,
    url_builder: UrlBuilder,
    favorites: FavoritesService,
    history: HistoryService,
    picker: Arc<dyn PathPicker>,
    /// Dialog opened by the last command, not yet handed to the loop.
    pending_browse: Option<PendingBrowse>,
    browse_open: bool,
    clear_selection_after_assign: bool,
}

impl AppState {
    pub fn new_with_config(
        config: &Config,
        store: KeyValueStore,
        picker: Box<dyn PathPicker>,
    ) -> Self {
        Self::with_clock(config, store, picker, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &Config,
        store: KeyValueStore,
        picker: Box<dyn PathPicker>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let prefix = &config.storage.key_prefix;
        Self {
            engine: GridSelectionEngine::new(config.grid.size()),
            selected_app: None,
            monitors: MonitorBoard::default(),
            url_builder: UrlBuilder::new(),
            favorites: FavoritesService::with_clock(store.clone(), prefix, clock.clone()),
            history: HistoryService::with_clock(store, prefix, clock),
            picker: Arc::from(picker),
            pending_browse: None,
            browse_open: false,
            clear_selection_after_assign: config.behavior.clear_selection_after_assign,
        }
    }

    pub fn engine(&self) -> &GridSelectionEngine {
        &self.engine
    }

    pub fn selected_app(&self) -> Option<AppId> {
        self.selected_app
    }

    pub fn favorites(&self) -> &FavoritesService {
        &self.favorites
    }

    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    fn grid_state(&self) -> IpcResponse {
        let size = self.engine.size();
        IpcResponse::GridState {
            rows: size.rows,
            cols: size.cols,
            selection: self.engine.selection().iter().map(|c| c.key()).collect(),
            assignments: self.engine.assignments().to_keyed(),
            selected_app: self.selected_app(),
            dragging: self.engine.is_dragging(),
            has_clipboard: self.engine.clipboard().is_some(),
        }
    }

    fn monitors_state(&self) -> IpcResponse {
        IpcResponse::Monitors {
            monitors: self.monitors.monitors().to_vec(),
            presets: self.monitors.presets().to_vec(),
            current: self.monitors.current_monitor_id().to_string(),
            pending: self.monitors.pending_presets().clone(),
            extent: self.monitors.extent(),
        }
    }

    fn url_builder_state(&self) -> IpcResponse {
        IpcResponse::UrlBuilder {
            draft: self.url_builder.draft().clone(),
            browsers: self.url_builder.browsers().to_vec(),
        }
    }

    fn after_bulk_write(&mut self, written: usize) {
        if written > 0 && self.clear_selection_after_assign {
            self.engine.clear_selection();
        }
    }

    /// Handle a command and produce a response.
    ///
    /// `browse_app` only opens the picker; collect the dialog with
    /// [`AppState::take_pending_browse`].
    pub fn handle_command(&mut self, cmd: IpcCommand) -> IpcResponse {
        debug!("Handling command: {:?}", cmd);
        match cmd {
            IpcCommand::BeginDrag {
                row,
                col,
                modifiers,
            } => grid_result(self.engine.begin_drag(row, col, modifiers)),
            IpcCommand::UpdateDrag { row, col } => grid_result(self.engine.update_drag(row, col)),
            IpcCommand::EndDrag => {
                self.engine.end_drag();
                IpcResponse::Ok
            }
            IpcCommand::ToggleCell { row, col } => grid_result(self.engine.toggle_cell(row, col)),
            IpcCommand::ClearSelection => {
                self.engine.clear_selection();
                IpcResponse::Ok
            }

            IpcCommand::SetSelectedApp { app } => {
                self.selected_app = app;
                IpcResponse::Ok
            }
            IpcCommand::AssignSelected => {
                let written = self.engine.assign_selected(self.selected_app);
                if self.selected_app.is_none() {
                    debug!("Assign ignored: no application armed");
                }
                self.after_bulk_write(written);
                IpcResponse::Ok
            }
            IpcCommand::UnassignSelected => {
                let written = self.engine.unassign_selected();
                self.after_bulk_write(written);
                IpcResponse::Ok
            }
            IpcCommand::ClearGrid => {
                self.engine.clear_grid();
                IpcResponse::Ok
            }
            IpcCommand::CopyGrid => {
                self.engine.copy_grid();
                IpcResponse::Ok
            }
            IpcCommand::PasteGrid => {
                if !self.engine.paste_grid() {
                    debug!("Paste ignored: clipboard is empty");
                }
                IpcResponse::Ok
            }
            IpcCommand::QueryGrid => self.grid_state(),

            IpcCommand::SetCurrentMonitor { monitor_id } => {
                grid_result(self.monitors.set_current_monitor(&monitor_id))
            }
            IpcCommand::SetPendingPreset { monitor_id, preset } => {
                grid_result(self.monitors.set_pending_preset(&monitor_id, preset))
            }
            IpcCommand::QueryMonitors => self.monitors_state(),

            IpcCommand::ListFavorites => IpcResponse::Favorites {
                items: self.favorites.list().to_vec(),
            },
            IpcCommand::AddFavorite {
                kind,
                title,
                path_or_url,
                icon,
                force,
            } => {
                let input = NewFavorite {
                    kind,
                    title,
                    path_or_url,
                    icon,
                };
                if let Err(e) = validate_favorite(&input, force) {
                    return input_error_response(e);
                }
                IpcResponse::Favorite {
                    item: Some(self.favorites.add(input)),
                }
            }
            IpcCommand::UpdateFavorite { id, patch } => IpcResponse::Favorite {
                item: self.favorites.update(&id, &patch),
            },
            IpcCommand::RemoveFavorite { id } => {
                if !self.favorites.remove(&id) {
                    debug!("No favorite with id {}", id);
                }
                IpcResponse::Ok
            }
            IpcCommand::ClearFavorites => {
                self.favorites.clear();
                IpcResponse::Ok
            }

            IpcCommand::ListHistory => IpcResponse::History {
                items: self.history.list(),
            },
            IpcCommand::AddHistory { title, path, force } => {
                let input = NewHistoryItem { title, path };
                if let Err(e) = validate_history(&input, force) {
                    return input_error_response(e);
                }
                IpcResponse::HistoryItem {
                    item: self.history.add(input),
                }
            }
            IpcCommand::BrowseApp { title } => self.start_browse(title),
            IpcCommand::RemoveHistory { id } => {
                if !self.history.remove(&id) {
                    debug!("No history entry with id {}", id);
                }
                IpcResponse::Ok
            }
            IpcCommand::ClearHistory => {
                self.history.clear();
                IpcResponse::Ok
            }

            IpcCommand::SetUrlBrowser { browser } => {
                self.url_builder.set_browser(browser);
                IpcResponse::Ok
            }
            IpcCommand::SetUrlOpenMode { mode } => {
                self.url_builder.set_open_mode(mode);
                IpcResponse::Ok
            }
            IpcCommand::AddBrowser { name } => {
                if self.url_builder.add_browser(&name) {
                    IpcResponse::Ok
                } else {
                    IpcResponse::info(format!("Browser '{}' is already listed", name.trim()))
                }
            }
            IpcCommand::AddTabGroup => {
                let id = self.url_builder.add_tab_group();
                debug!("Added tab group {}", id);
                self.url_builder_state()
            }
            IpcCommand::SetTabTitle { group_id, title } => {
                flag_result(self.url_builder.set_tab_title(&group_id, &title), || {
                    format!("Unknown tab group: {}", group_id)
                })
            }
            IpcCommand::SetUrlLine {
                group_id,
                index,
                value,
            } => flag_result(
                self.url_builder.set_url_line(&group_id, index, &value),
                || format!("Unknown URL line {} in tab group {}", index, group_id),
            ),
            IpcCommand::AddUrlLine { group_id } => {
                flag_result(self.url_builder.add_url_line(&group_id), || {
                    format!("Unknown tab group: {}", group_id)
                })
            }
            IpcCommand::ResetUrlBuilder => {
                self.url_builder.reset();
                IpcResponse::Ok
            }
            IpcCommand::QueryUrlBuilder => self.url_builder_state(),

            IpcCommand::Stop => {
                info!("Stop command received");
                IpcResponse::Ok
            }
        }
    }

    /// Open the picker without waiting for it.
    fn start_browse(&mut self, title: Option<String>) -> IpcResponse {
        if !self.picker.is_available() {
            return IpcResponse::info(PICKER_UNAVAILABLE_MESSAGE);
        }
        if self.browse_open {
            return IpcResponse::info(PICKER_BUSY_MESSAGE);
        }

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let request = PickRequest::application(title.as_deref().unwrap_or(DEFAULT_PICKER_TITLE));
        let picker = Arc::clone(&self.picker);
        self.pending_browse = Some(PendingBrowse {
            title,
            pick: Box::pin(async move { picker.pick(&request).await }),
        });
        self.browse_open = true;
        IpcResponse::info(PICKER_OPENED_MESSAGE)
    }

    /// Dialog opened by the last `browse_app`, if any.
    pub fn take_pending_browse(&mut self) -> Option<PendingBrowse> {
        self.pending_browse.take()
    }

    /// Record the picked path in history.
    ///
    /// The path goes through the same checks as `add_history`, so a file
    /// without a launchable extension yields `needs_confirmation` naming the
    /// path; the UI confirms by sending `add_history` with `force`.
    /// Cancellation and a missing picker are reported as information and
    /// leave history untouched.
    pub fn finish_browse(&mut self, outcome: BrowseOutcome) -> IpcResponse {
        self.browse_open = false;
        let path = match outcome.result {
            Ok(Some(path)) => path,
            Ok(None) => return IpcResponse::info(NO_FILE_SELECTED_MESSAGE),
            Err(PickerError::Unavailable) => return IpcResponse::info(PICKER_UNAVAILABLE_MESSAGE),
            Err(e) => {
                warn!("{}", e);
                return IpcResponse::info(PICKER_UNAVAILABLE_MESSAGE);
            }
        };

        let title = outcome.title.unwrap_or_else(|| infer_title_from_path(&path));
        let input = NewHistoryItem::new(title, path);
        if let Err(e) = validate_history(&input, false) {
            return input_error_response(e);
        }
        IpcResponse::HistoryItem {
            item: self.history.add(input),
        }
    }
}

fn grid_result<E: std::fmt::Display>(result: Result<(), E>) -> IpcResponse {
    match result {
        Ok(()) => IpcResponse::Ok,
        Err(e) => IpcResponse::error(e.to_string()),
    }
}

fn flag_result(applied: bool, message: impl FnOnce() -> String) -> IpcResponse {
    if applied {
        IpcResponse::Ok
    } else {
        IpcResponse::error(message())
    }
}

fn input_error_response(e: InputError) -> IpcResponse {
    if e.needs_confirmation() {
        IpcResponse::needs_confirmation(e.to_string())
    } else {
        IpcResponse::error(e.to_string())
    }
}
