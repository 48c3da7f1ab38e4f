//! Dense cell-to-application assignment map.

use crate::{AppId, Cell, GridError, GridSize};
use serde::Serialize;
use std::collections::BTreeMap;

/// Total mapping from every grid cell to an optional application.
///
/// Backed by a row-major vector with exactly `rows * cols` slots, so there is
/// no "missing key" state: every cell always has an entry, possibly `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentMap {
    size: GridSize,
    cells: Vec<Option<AppId>>,
}

impl AssignmentMap {
    /// Create an all-empty map for the given grid.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cell_count()],
        }
    }

    /// Grid dimensions this map covers.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Number of entries (always `rows * cols`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True only for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Application assigned to a cell.
    pub fn get(&self, cell: Cell) -> Result<Option<AppId>, GridError> {
        let cell = self.size.check(cell.row, cell.col)?;
        Ok(self.cells[self.size.index_of(cell)])
    }

    /// Set or clear the application of a cell.
    pub fn set(&mut self, cell: Cell, app: Option<AppId>) -> Result<(), GridError> {
        let cell = self.size.check(cell.row, cell.col)?;
        let index = self.size.index_of(cell);
        self.cells[index] = app;
        Ok(())
    }

    /// Reset every entry to `None`.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of cells holding an application.
    pub fn assigned_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// All entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, Option<AppId>)> + '_ {
        self.size.cells().zip(self.cells.iter().copied())
    }

    /// Entries keyed by canonical cell key (`"r,c"`).
    pub fn to_keyed(&self) -> BTreeMap<String, Option<AppId>> {
        self.iter().map(|(cell, app)| (cell.key(), app)).collect()
    }
}
