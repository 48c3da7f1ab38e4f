//! Drag-to-select state machine and bulk assignment operations.
//!
//! A gesture goes `Idle -> Dragging -> Idle`:
//! - `begin_drag` records the anchor and decides additive vs. replacing mode
//! - `update_drag` recomputes the rectangle from the anchor to the pointer
//! - `end_drag` drops the bookkeeping; the last selection stays
//!
//! Assignment operations never touch the drag state and the selection never
//! changes as a side effect of assigning.

use crate::{AppId, AssignmentMap, Cell, GridError, GridSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Keyboard modifiers held when a gesture starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub fn none() -> Self {
        Self::default()
    }

    /// Ctrl held (the usual "add to selection" chord).
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Any modifier makes the gesture add to the prior selection.
    pub fn is_additive(&self) -> bool {
        self.ctrl || self.meta || self.shift
    }
}

/// Selection gesture state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        anchor: Cell,
        additive: bool,
        /// Selection captured at gesture start (empty unless additive).
        base: BTreeSet<Cell>,
    },
}

/// Inclusive rectangle spanned by two corners, independent of drag direction.
pub fn rect_selection(a: Cell, b: Cell) -> BTreeSet<Cell> {
    let (row_min, row_max) = (a.row.min(b.row), a.row.max(b.row));
    let (col_min, col_max) = (a.col.min(b.col), a.col.max(b.col));
    (row_min..=row_max)
        .flat_map(|row| (col_min..=col_max).map(move |col| Cell::new(row, col)))
        .collect()
}

/// Owns the selection, the assignment map and the clipboard for one grid.
#[derive(Debug, Clone)]
pub struct GridSelectionEngine {
    size: GridSize,
    selection: BTreeSet<Cell>,
    assignments: AssignmentMap,
    clipboard: Option<AssignmentMap>,
    drag: DragState,
}

impl Default for GridSelectionEngine {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}

impl GridSelectionEngine {
    /// Create an engine with an empty selection and an all-empty map.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            selection: BTreeSet::new(),
            assignments: AssignmentMap::new(size),
            clipboard: None,
            drag: DragState::Idle,
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn selection(&self) -> &BTreeSet<Cell> {
        &self.selection
    }

    pub fn assignments(&self) -> &AssignmentMap {
        &self.assignments
    }

    pub fn clipboard(&self) -> Option<&AssignmentMap> {
        self.clipboard.as_ref()
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn is_selected(&self, cell: Cell) -> bool {
        self.selection.contains(&cell)
    }

    /// Application assigned to a cell.
    pub fn assignment_at(&self, row: usize, col: usize) -> Result<Option<AppId>, GridError> {
        self.assignments.get(Cell::new(row, col))
    }

    /// Start a gesture at `(row, col)`.
    ///
    /// Without modifiers the prior selection is discarded; with any modifier
    /// the prior selection becomes the base that every drag step unions with.
    pub fn begin_drag(
        &mut self,
        row: usize,
        col: usize,
        modifiers: Modifiers,
    ) -> Result<(), GridError> {
        let anchor = self.size.check(row, col)?;
        let additive = modifiers.is_additive();
        let base = if additive {
            self.selection.clone()
        } else {
            BTreeSet::new()
        };

        let mut selection = base.clone();
        selection.insert(anchor);
        self.selection = selection;
        self.drag = DragState::Dragging {
            anchor,
            additive,
            base,
        };
        Ok(())
    }

    /// Move the gesture's free corner to `(row, col)`. No-op when idle.
    pub fn update_drag(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let current = self.size.check(row, col)?;
        let DragState::Dragging {
            anchor,
            additive,
            base,
        } = &self.drag
        else {
            return Ok(());
        };

        let rect = rect_selection(*anchor, current);
        self.selection = if *additive {
            base.union(&rect).copied().collect()
        } else {
            rect
        };
        Ok(())
    }

    /// Finish the gesture. Safe to call while idle.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Flip a single cell's membership in the selection.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        let cell = self.size.check(row, col)?;
        if !self.selection.remove(&cell) {
            self.selection.insert(cell);
        }
        Ok(())
    }

    /// Empty the selection and cancel any gesture in progress.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.drag = DragState::Idle;
    }

    /// Assign the armed application to every selected cell.
    ///
    /// Returns the number of cells written; `0` when nothing is armed.
    pub fn assign_selected(&mut self, armed: Option<AppId>) -> usize {
        let Some(app) = armed else {
            return 0;
        };
        self.write_selected(Some(app))
    }

    /// Clear the application of every selected cell.
    pub fn unassign_selected(&mut self) -> usize {
        self.write_selected(None)
    }

    fn write_selected(&mut self, app: Option<AppId>) -> usize {
        let mut written = 0;
        for &cell in &self.selection {
            // Selection only ever holds cells validated against `size`.
            if self.assignments.set(cell, app).is_ok() {
                written += 1;
            }
        }
        written
    }

    /// Unassign every cell, ignoring the selection.
    pub fn clear_grid(&mut self) {
        self.assignments.clear();
    }

    /// Snapshot the assignment map, replacing any earlier snapshot.
    pub fn copy_grid(&mut self) {
        self.clipboard = Some(self.assignments.clone());
    }

    /// Replace the assignment map with the clipboard snapshot.
    ///
    /// Returns `false` (and changes nothing) when the clipboard is empty.
    /// The snapshot stays available for further pastes.
    pub fn paste_grid(&mut self) -> bool {
        match &self.clipboard {
            Some(snapshot) => {
                self.assignments = snapshot.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cells(pairs: &[(usize, usize)]) -> BTreeSet<Cell> {
        pairs.iter().map(|&(r, c)| Cell::new(r, c)).collect()
    }

    #[test]
    fn test_rect_selection_inclusive() {
        let rect = rect_selection(Cell::new(1, 1), Cell::new(2, 3));
        assert_eq!(rect.len(), 6);
        assert!(rect.contains(&Cell::new(1, 1)));
        assert!(rect.contains(&Cell::new(2, 3)));
        assert!(!rect.contains(&Cell::new(3, 3)));
    }

    #[test]
    fn test_rect_selection_single_cell() {
        let rect = rect_selection(Cell::new(4, 2), Cell::new(4, 2));
        assert_eq!(rect, cells(&[(4, 2)]));
    }

    #[test]
    fn test_begin_drag_selects_anchor() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(3, 4, Modifiers::none()).unwrap();
        assert!(engine.is_dragging());
        assert_eq!(engine.selection(), &cells(&[(3, 4)]));
    }

    #[test]
    fn test_drag_up_left_matches_down_right() {
        let mut down_right = GridSelectionEngine::default();
        down_right.begin_drag(1, 1, Modifiers::none()).unwrap();
        down_right.update_drag(4, 3).unwrap();

        let mut up_left = GridSelectionEngine::default();
        up_left.begin_drag(4, 3, Modifiers::none()).unwrap();
        up_left.update_drag(1, 1).unwrap();

        assert_eq!(down_right.selection(), up_left.selection());
        assert_eq!(down_right.selection().len(), 12);
    }

    #[test]
    fn test_update_drag_shrinks_rectangle() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(3, 3).unwrap();
        assert_eq!(engine.selection().len(), 16);
        engine.update_drag(1, 0).unwrap();
        assert_eq!(engine.selection(), &cells(&[(0, 0), (1, 0)]));
    }

    #[test]
    fn test_non_additive_discards_prior_selection() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(5, 5).unwrap();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(0, 1).unwrap();
        assert_eq!(engine.selection(), &cells(&[(0, 0), (0, 1)]));
    }

    #[test]
    fn test_additive_drag_keeps_prior_selection() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(0, 1).unwrap();
        engine.end_drag();

        engine.begin_drag(3, 3, Modifiers::ctrl()).unwrap();
        assert_eq!(engine.selection(), &cells(&[(0, 0), (0, 1), (3, 3)]));

        engine.update_drag(4, 3).unwrap();
        assert_eq!(engine.selection(), &cells(&[(0, 0), (0, 1), (3, 3), (4, 3)]));

        // Shrinking the rectangle never drops base cells
        engine.update_drag(3, 3).unwrap();
        assert_eq!(engine.selection(), &cells(&[(0, 0), (0, 1), (3, 3)]));
    }

    #[test]
    fn test_meta_and_shift_are_additive() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        let shift = Modifiers {
            shift: true,
            ..Modifiers::default()
        };
        assert!(meta.is_additive());
        assert!(shift.is_additive());
        assert!(!Modifiers::none().is_additive());
    }

    #[test]
    fn test_update_drag_when_idle_is_noop() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(2, 2).unwrap();
        engine.update_drag(4, 4).unwrap();
        assert_eq!(engine.selection(), &cells(&[(2, 2)]));
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_end_drag_keeps_selection_and_tolerates_idle() {
        let mut engine = GridSelectionEngine::default();
        engine.end_drag();
        assert!(!engine.is_dragging());

        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(1, 1).unwrap();
        engine.end_drag();
        assert!(!engine.is_dragging());
        assert_eq!(engine.selection().len(), 4);

        // Stray pointer move after release does nothing
        engine.update_drag(5, 5).unwrap();
        assert_eq!(engine.selection().len(), 4);
    }

    #[test]
    fn test_toggle_cell() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(1, 2).unwrap();
        assert!(engine.is_selected(Cell::new(1, 2)));
        engine.toggle_cell(1, 2).unwrap();
        assert!(!engine.is_selected(Cell::new(1, 2)));
    }

    #[test]
    fn test_clear_selection_cancels_drag() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(2, 2).unwrap();
        engine.clear_selection();
        assert!(engine.selection().is_empty());
        assert!(!engine.is_dragging());

        engine.update_drag(3, 3).unwrap();
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn test_out_of_range_rejected_without_side_effects() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(1, 1, Modifiers::none()).unwrap();
        let before = engine.selection().clone();

        assert!(matches!(
            engine.update_drag(6, 0),
            Err(GridError::CellOutOfBounds { row: 6, .. })
        ));
        assert!(engine.begin_drag(0, 9, Modifiers::none()).is_err());
        assert!(engine.toggle_cell(7, 7).is_err());

        assert_eq!(engine.selection(), &before);
        assert!(engine.is_dragging());
        assert!(engine.assignment_at(6, 6).is_err());
    }

    #[test]
    fn test_assign_without_armed_app_is_noop() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(0, 0).unwrap();
        assert_eq!(engine.assign_selected(None), 0);
        assert_eq!(engine.assignments().assigned_count(), 0);
    }

    #[test]
    fn test_assign_and_unassign_selected() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(0, 2).unwrap();
        engine.end_drag();

        assert_eq!(engine.assign_selected(Some(AppId::Outlook)), 3);
        assert_eq!(engine.assignment_at(0, 1).unwrap(), Some(AppId::Outlook));
        assert_eq!(engine.selection().len(), 3);

        engine.clear_selection();
        engine.toggle_cell(0, 1).unwrap();
        assert_eq!(engine.unassign_selected(), 1);
        assert_eq!(engine.assignment_at(0, 1).unwrap(), None);
        assert_eq!(engine.assignment_at(0, 2).unwrap(), Some(AppId::Outlook));
    }

    #[test]
    fn test_unassign_with_empty_selection() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(0, 0).unwrap();
        engine.assign_selected(Some(AppId::Chrome));
        engine.clear_selection();
        assert_eq!(engine.unassign_selected(), 0);
        assert_eq!(engine.assignments().assigned_count(), 1);
    }

    #[test]
    fn test_clear_grid_ignores_selection() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(0, 0, Modifiers::none()).unwrap();
        engine.update_drag(5, 5).unwrap();
        engine.assign_selected(Some(AppId::Notepad));
        engine.clear_selection();

        engine.clear_grid();
        assert_eq!(engine.assignments().assigned_count(), 0);
        assert_eq!(engine.assignments().len(), 36);
    }

    #[test]
    fn test_paste_without_clipboard_is_noop() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(1, 1).unwrap();
        engine.assign_selected(Some(AppId::GitHub));
        assert!(!engine.paste_grid());
        assert_eq!(engine.assignment_at(1, 1).unwrap(), Some(AppId::GitHub));
    }

    #[test]
    fn test_copy_clear_paste_round_trip() {
        let mut engine = GridSelectionEngine::default();
        engine.begin_drag(2, 2, Modifiers::none()).unwrap();
        engine.update_drag(3, 4).unwrap();
        engine.assign_selected(Some(AppId::VsCode));
        engine.clear_selection();
        engine.toggle_cell(0, 5).unwrap();
        engine.assign_selected(Some(AppId::Chrome));

        let before = engine.assignments().clone();
        engine.copy_grid();
        engine.clear_grid();
        assert_ne!(engine.assignments(), &before);

        assert!(engine.paste_grid());
        assert_eq!(engine.assignments(), &before);

        // Clipboard survives a paste
        engine.clear_grid();
        assert!(engine.paste_grid());
        assert_eq!(engine.assignments(), &before);
    }

    #[test]
    fn test_copy_overwrites_previous_snapshot() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(0, 0).unwrap();
        engine.assign_selected(Some(AppId::Chrome));
        engine.copy_grid();

        engine.assign_selected(Some(AppId::Outlook));
        engine.copy_grid();

        engine.clear_grid();
        engine.paste_grid();
        assert_eq!(engine.assignment_at(0, 0).unwrap(), Some(AppId::Outlook));
    }

    #[test]
    fn test_clipboard_is_a_deep_snapshot() {
        let mut engine = GridSelectionEngine::default();
        engine.toggle_cell(0, 0).unwrap();
        engine.assign_selected(Some(AppId::Chrome));
        engine.copy_grid();

        engine.assign_selected(Some(AppId::Notepad));
        let clip = engine.clipboard().unwrap();
        assert_eq!(clip.get(Cell::new(0, 0)).unwrap(), Some(AppId::Chrome));
    }

    #[test]
    fn test_two_by_two_scenario() {
        let mut engine = GridSelectionEngine::new(GridSize::new(6, 6));
        engine.begin_drag(1, 1, Modifiers::none()).unwrap();
        engine.update_drag(2, 2).unwrap();
        assert_eq!(engine.selection(), &cells(&[(1, 1), (1, 2), (2, 1), (2, 2)]));

        engine.assign_selected(Some(AppId::Chrome));
        let keyed = engine.assignments().to_keyed();
        assert_eq!(keyed.len(), 36);
        let chrome: Vec<&String> = keyed
            .iter()
            .filter(|(_, app)| **app == Some(AppId::Chrome))
            .map(|(key, _)| key)
            .collect();
        assert_eq!(chrome, vec!["1,1", "1,2", "2,1", "2,2"]);
        assert_eq!(keyed.values().filter(|app| app.is_none()).count(), 32);

        engine.end_drag();
        assert_eq!(engine.selection().len(), 4);

        engine.clear_selection();
        assert!(engine.selection().is_empty());
        assert_eq!(engine.assignments().assigned_count(), 4);
    }

    fn arb_cell() -> impl Strategy<Value = (usize, usize)> {
        (0usize..6, 0usize..6)
    }

    proptest! {
        #[test]
        fn selection_depends_only_on_corner_pair(a in arb_cell(), b in arb_cell()) {
            let mut forward = GridSelectionEngine::default();
            forward.begin_drag(a.0, a.1, Modifiers::none()).unwrap();
            forward.update_drag(b.0, b.1).unwrap();

            let mut reverse = GridSelectionEngine::default();
            reverse.begin_drag(b.0, b.1, Modifiers::none()).unwrap();
            reverse.update_drag(a.0, a.1).unwrap();

            prop_assert_eq!(forward.selection(), reverse.selection());
            let expected = (a.0.abs_diff(b.0) + 1) * (a.1.abs_diff(b.1) + 1);
            prop_assert_eq!(forward.selection().len(), expected);
        }

        #[test]
        fn additive_gesture_preserves_prior_selection(
            prior in proptest::collection::btree_set(arb_cell(), 0..10),
            anchor in arb_cell(),
            steps in proptest::collection::vec(arb_cell(), 1..6),
        ) {
            let mut engine = GridSelectionEngine::default();
            for &(r, c) in &prior {
                engine.toggle_cell(r, c).unwrap();
            }
            let base = engine.selection().clone();

            engine.begin_drag(anchor.0, anchor.1, Modifiers::ctrl()).unwrap();
            prop_assert!(base.is_subset(engine.selection()));
            for &(r, c) in &steps {
                engine.update_drag(r, c).unwrap();
                prop_assert!(base.is_subset(engine.selection()));
            }
        }

        #[test]
        fn replacing_gesture_stays_inside_rectangle(
            prior in proptest::collection::btree_set(arb_cell(), 0..10),
            anchor in arb_cell(),
            current in arb_cell(),
        ) {
            let mut engine = GridSelectionEngine::default();
            for &(r, c) in &prior {
                engine.toggle_cell(r, c).unwrap();
            }

            engine.begin_drag(anchor.0, anchor.1, Modifiers::none()).unwrap();
            engine.update_drag(current.0, current.1).unwrap();

            let rect = rect_selection(
                Cell::new(anchor.0, anchor.1),
                Cell::new(current.0, current.1),
            );
            prop_assert_eq!(engine.selection(), &rect);
        }

        #[test]
        fn assignment_map_stays_total(ops in proptest::collection::vec(0u8..6, 0..40)) {
            let mut engine = GridSelectionEngine::default();
            for (i, op) in ops.iter().enumerate() {
                let r = i % 6;
                let c = (i * 5) % 6;
                match op {
                    0 => { engine.toggle_cell(r, c).unwrap(); }
                    1 => { engine.assign_selected(Some(AppId::Chrome)); }
                    2 => { engine.unassign_selected(); }
                    3 => engine.clear_grid(),
                    4 => engine.copy_grid(),
                    _ => { engine.paste_grid(); }
                }
                prop_assert_eq!(engine.assignments().len(), 36);
                let keyed = engine.assignments().to_keyed();
                prop_assert_eq!(keyed.len(), 36);
                for key in keyed.keys() {
                    let cell = Cell::parse_key(key).unwrap();
                    prop_assert!(engine.size().contains(cell));
                }
            }
        }
    }
}
