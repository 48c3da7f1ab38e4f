//! Monitors, layout presets, and per-monitor pending preset choices.
//!
//! Presets are only ever recorded as a pending choice; nothing here applies
//! one to the assignment map.

use crate::{GridError, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role of a monitor in the display arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorRole {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// A monitor as shown in the display-array preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: String,
    pub name: String,
    pub role: MonitorRole,
    /// Human-readable resolution, e.g. `"1920×1080"`.
    pub resolution: String,
    pub active: bool,
    /// Position in preview coordinates (not physical pixels).
    pub bounds: Rect,
    pub orientation: Orientation,
}

/// Identifier of a layout preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetId {
    DailyDesk,
    Coding,
    Meetings,
    Research,
    Design,
    Monitoring,
}

/// A named layout preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn monitor(
    id: &str,
    role: MonitorRole,
    resolution: &str,
    bounds: Rect,
    orientation: Orientation,
) -> Monitor {
    let number = id.trim_start_matches('m');
    Monitor {
        id: id.to_string(),
        name: format!("Monitor {}", number),
        role,
        resolution: resolution.to_string(),
        active: true,
        bounds,
        orientation,
    }
}

/// Sample four-monitor arrangement (preview viewBox is roughly 1000×360).
pub fn sample_monitors() -> Vec<Monitor> {
    vec![
        monitor(
            "m3",
            MonitorRole::Secondary,
            "1920×1080",
            Rect::new(220, 160, 260, 90),
            Orientation::Landscape,
        ),
        monitor(
            "m2",
            MonitorRole::Secondary,
            "1920×1080",
            Rect::new(480, 160, 260, 90),
            Orientation::Landscape,
        ),
        monitor(
            "m4",
            MonitorRole::Secondary,
            "1280×720",
            Rect::new(470, 110, 120, 45),
            Orientation::Landscape,
        ),
        monitor(
            "m1",
            MonitorRole::Primary,
            "2560×1440",
            Rect::new(760, 140, 70, 150),
            Orientation::Portrait,
        ),
    ]
}

fn preset(id: PresetId, name: &str, note: &str) -> Preset {
    Preset {
        id,
        name: name.to_string(),
        note: Some(note.to_string()),
    }
}

/// Built-in presets.
pub fn sample_presets() -> Vec<Preset> {
    vec![
        preset(PresetId::DailyDesk, "Daily Desk", "Email, Browser, Notes"),
        preset(PresetId::Coding, "Coding", "IDE, Docs, Terminal"),
        preset(PresetId::Meetings, "Meetings", "Calendar, Teams/Meet"),
        preset(PresetId::Research, "Research", "Browser groups"),
        preset(PresetId::Design, "Design", "Canvas & Assets"),
        preset(PresetId::Monitoring, "Monitoring", "Dashboards"),
    ]
}

/// Monitors, the monitor being edited, and pending preset choices.
#[derive(Debug, Clone)]
pub struct MonitorBoard {
    monitors: Vec<Monitor>,
    presets: Vec<Preset>,
    current: String,
    pending: BTreeMap<String, Option<PresetId>>,
}

impl Default for MonitorBoard {
    fn default() -> Self {
        Self::new(sample_monitors(), sample_presets())
    }
}

impl MonitorBoard {
    /// Create a board. The primary monitor (or the first one) starts current.
    pub fn new(monitors: Vec<Monitor>, presets: Vec<Preset>) -> Self {
        let current = monitors
            .iter()
            .find(|m| m.role == MonitorRole::Primary)
            .or_else(|| monitors.first())
            .map(|m| m.id.clone())
            .unwrap_or_default();
        let pending = monitors.iter().map(|m| (m.id.clone(), None)).collect();

        Self {
            monitors,
            presets,
            current,
            pending,
        }
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn current_monitor_id(&self) -> &str {
        &self.current
    }

    pub fn current_monitor(&self) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.id == self.current)
    }

    /// Switch the monitor being edited.
    pub fn set_current_monitor(&mut self, id: &str) -> Result<(), GridError> {
        if !self.monitors.iter().any(|m| m.id == id) {
            return Err(GridError::UnknownMonitor(id.to_string()));
        }
        self.current = id.to_string();
        Ok(())
    }

    /// Record (or clear) the preset chosen for a monitor.
    pub fn set_pending_preset(
        &mut self,
        monitor_id: &str,
        preset: Option<PresetId>,
    ) -> Result<(), GridError> {
        if !self.monitors.iter().any(|m| m.id == monitor_id) {
            return Err(GridError::UnknownMonitor(monitor_id.to_string()));
        }
        self.pending.insert(monitor_id.to_string(), preset);
        Ok(())
    }

    /// Pending preset for a monitor; `None` for unknown monitors too.
    pub fn pending_preset(&self, monitor_id: &str) -> Option<PresetId> {
        self.pending.get(monitor_id).copied().flatten()
    }

    pub fn pending_presets(&self) -> &BTreeMap<String, Option<PresetId>> {
        &self.pending
    }

    /// Bounding box of all monitors in preview coordinates.
    pub fn extent(&self) -> Option<Rect> {
        let mut iter = self.monitors.iter().map(|m| m.bounds);
        let first = iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(&r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_starts_on_primary() {
        let board = MonitorBoard::default();
        assert_eq!(board.monitors().len(), 4);
        assert_eq!(board.presets().len(), 6);
        assert_eq!(board.current_monitor_id(), "m1");
        assert_eq!(
            board.current_monitor().map(|m| m.orientation),
            Some(Orientation::Portrait)
        );
    }

    #[test]
    fn test_set_current_monitor() {
        let mut board = MonitorBoard::default();
        board.set_current_monitor("m3").unwrap();
        assert_eq!(board.current_monitor_id(), "m3");
        assert!(matches!(
            board.set_current_monitor("m9"),
            Err(GridError::UnknownMonitor(_))
        ));
        assert_eq!(board.current_monitor_id(), "m3");
    }

    #[test]
    fn test_pending_presets() {
        let mut board = MonitorBoard::default();
        assert_eq!(board.pending_preset("m2"), None);
        assert_eq!(board.pending_presets().len(), 4);

        board.set_pending_preset("m2", Some(PresetId::Coding)).unwrap();
        assert_eq!(board.pending_preset("m2"), Some(PresetId::Coding));
        assert_eq!(board.pending_preset("m1"), None);

        board.set_pending_preset("m2", None).unwrap();
        assert_eq!(board.pending_preset("m2"), None);

        assert!(board.set_pending_preset("nope", Some(PresetId::Design)).is_err());
        assert_eq!(board.pending_preset("nope"), None);
    }

    #[test]
    fn test_extent_covers_all_monitors() {
        let board = MonitorBoard::default();
        let extent = board.extent().unwrap();
        assert_eq!(extent.x, 220);
        assert_eq!(extent.y, 110);
        assert_eq!(extent.right(), 830);
        assert_eq!(extent.bottom(), 290);
    }

    #[test]
    fn test_empty_board() {
        let board = MonitorBoard::new(Vec::new(), sample_presets());
        assert_eq!(board.current_monitor_id(), "");
        assert!(board.current_monitor().is_none());
        assert!(board.extent().is_none());
    }

    #[test]
    fn test_preset_id_serialization() {
        let json = serde_json::to_string(&PresetId::DailyDesk).unwrap();
        assert_eq!(json, "\"daily-desk\"");
    }
}
