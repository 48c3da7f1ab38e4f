//! Static catalog of known applications that can be assigned to grid cells.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a known application.
///
/// Serialized by its display name, so stored layouts read `"VS Code"` rather
/// than a Rust variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppId {
    Outlook,
    Chrome,
    #[serde(rename = "VS Code")]
    VsCode,
    Notepad,
    GitHub,
}

/// Display metadata for a known application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub id: AppId,
    pub name: &'static str,
    pub category: &'static str,
    /// CSS-style hex color used to paint assigned cells.
    pub color: &'static str,
}

/// Every known application, in picker order.
pub const APP_CATALOG: [AppInfo; 5] = [
    AppInfo {
        id: AppId::Outlook,
        name: "Outlook",
        category: "Communication",
        color: "#0078d4",
    },
    AppInfo {
        id: AppId::Chrome,
        name: "Chrome",
        category: "Browser",
        color: "#34a853",
    },
    AppInfo {
        id: AppId::VsCode,
        name: "VS Code",
        category: "Development",
        color: "#007acc",
    },
    AppInfo {
        id: AppId::Notepad,
        name: "Notepad",
        category: "Text",
        color: "#f2c94c",
    },
    AppInfo {
        id: AppId::GitHub,
        name: "GitHub",
        category: "Development",
        color: "#24292e",
    },
];

impl AppId {
    /// Catalog entry for this application.
    pub fn info(self) -> &'static AppInfo {
        // APP_CATALOG is declared in enum order.
        &APP_CATALOG[self as usize]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AppId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        APP_CATALOG
            .iter()
            .find(|info| info.name.eq_ignore_ascii_case(s.trim()))
            .map(|info| info.id)
            .ok_or_else(|| format!("Unknown application: {}", s))
    }
}
