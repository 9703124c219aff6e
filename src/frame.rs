//! Animation frames: sparse snapshots of changed grid cells.

use log::debug;
use std::collections::HashMap;

use crate::grid::GridWorld;
use crate::record::{CellRecord, FrameRecord};
use crate::types::{CellState, GridPos};

/// A single frame of an animation: a mapping from position to cell state.
///
/// A frame is a *sparse diff*, never a full-grid copy: it only contains
/// positions that were recorded, and never a position with no state. Built
/// once from a recorder snapshot and immutable after being appended to an
/// animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationFrame {
    cells: HashMap<GridPos, CellState>,
}

impl AnimationFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame directly from a recorded buffer.
    pub fn from_cells(cells: HashMap<GridPos, CellState>) -> Self {
        Self { cells }
    }

    /// Insert or overwrite the entry for `pos`. Later calls for the same
    /// position overwrite.
    pub fn add_cell_state(&mut self, pos: GridPos, state: CellState) {
        self.cells.insert(pos, state);
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&GridPos, &CellState)> {
        self.cells.iter()
    }

    pub fn state_at(&self, pos: GridPos) -> Option<CellState> {
        self.cells.get(&pos).copied()
    }

    /// Apply every recorded cell to the named grid. Side effect only; the
    /// order of application across positions is unspecified (diffs are
    /// independent).
    pub fn apply(&self, world: &dyn GridWorld, grid: &str) {
        for (pos, state) in &self.cells {
            world.set_cell(grid, *pos, *state);
        }
    }

    // -----------------------------------------------------------------------
    // Record round-trip
    // -----------------------------------------------------------------------

    pub fn to_record(&self) -> FrameRecord {
        FrameRecord {
            cells: self
                .cells
                .iter()
                .map(|(pos, state)| CellRecord::new(pos.x, pos.y, pos.z, *state))
                .collect(),
        }
    }

    /// Rebuild a frame from its record.
    ///
    /// Cells carrying only the legacy split encoding cannot be mapped to a
    /// current state id and are dropped rather than guessed at. Returns the
    /// frame together with the number of dropped cells.
    pub fn from_record(record: &FrameRecord) -> (Self, usize) {
        let mut cells = HashMap::with_capacity(record.cells.len());
        let mut dropped = 0;

        for cell in &record.cells {
            match cell.state {
                Some(state) => {
                    cells.insert(GridPos::new(cell.x, cell.y, cell.z), state);
                }
                None => {
                    debug!(
                        "Dropping cell [{},{},{}] with unmappable legacy encoding",
                        cell.x, cell.y, cell.z
                    );
                    dropped += 1;
                }
            }
        }

        (Self { cells }, dropped)
    }
}
