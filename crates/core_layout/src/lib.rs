//! Instadesk Core Layout Engine
//!
//! Platform-agnostic grid engine behind the Instadesk layout editor.
//!
//! A layout is drawn on a fixed `rows × cols` grid where:
//! - The user drags a rectangle (or toggles single cells) to build a selection
//! - An "armed" application is assigned to every selected cell in one step
//! - The whole assignment map can be copied and pasted back later
//!
//! Nothing here touches the operating system; the engine only records intent.

pub mod apps;
pub mod grid;
pub mod monitors;
pub mod selection;
pub mod url_builder;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use apps::{AppId, AppInfo, APP_CATALOG};
pub use grid::AssignmentMap;
pub use monitors::{Monitor, MonitorBoard, MonitorRole, Orientation, Preset, PresetId};
pub use selection::{rect_selection, DragState, GridSelectionEngine, Modifiers};
pub use url_builder::{UrlBuilder, UrlBuilderDraft, UrlGroup, UrlOpenMode};

/// Default number of grid rows.
pub const DEFAULT_ROWS: usize = 6;
/// Default number of grid columns.
pub const DEFAULT_COLS: usize = 6;

/// Errors that can occur during grid operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid cell key: {0:?}")]
    InvalidCellKey(String),

    #[error("Unknown monitor: {0}")]
    UnknownMonitor(String),
}

/// One addressable cell of the grid.
///
/// Ordered row-major, so a `BTreeSet<Cell>` iterates top-left to bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Create a new cell coordinate.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Canonical string key: `"{row},{col}"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.row, self.col)
    }

    /// Parse a canonical key back into a cell.
    pub fn parse_key(key: &str) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidCellKey(key.to_string());
        let (row, col) = key.split_once(',').ok_or_else(invalid)?;
        let row = row.parse().map_err(|_| invalid())?;
        let col = col.parse().map_err(|_| invalid())?;
        Ok(Self { row, col })
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Fixed grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridSize {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridSize {
    /// Create a grid size.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Check whether a cell lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Validate a coordinate pair, rejecting anything outside the grid.
    pub fn check(&self, row: usize, col: usize) -> Result<Cell, GridError> {
        let cell = Cell::new(row, col);
        if self.contains(cell) {
            Ok(cell)
        } else {
            Err(GridError::CellOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Row-major index of a cell. Caller must ensure the cell is in range.
    pub(crate) fn index_of(&self, cell: Cell) -> usize {
        cell.row * self.cols + cell.col
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Cell::new(row, col)))
    }
}

/// A rectangle in preview coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}
