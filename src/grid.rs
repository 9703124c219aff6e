//! Grid collaborator seam: GridWorld trait and the in-memory implementation.
//!
//! The animator never reads grid state back to validate its own writes; it
//! trusts `set_cell` to succeed or be a no-op, and treats the collaborator
//! as authoritative for current state.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::types::{CellState, GridPos};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can resolve grid identities and accept cell writes.
///
/// Implementations are shared across playback tasks and recording sessions;
/// cell writes compose in call order (last write wins per cell).
pub trait GridWorld: Send + Sync {
    /// True if the named grid exists and can accept cell writes.
    fn has_grid(&self, grid: &str) -> bool;

    /// Set one cell. Unknown grids are a no-op.
    fn set_cell(&self, grid: &str, pos: GridPos, state: CellState);
}

// ---------------------------------------------------------------------------
// In-memory grid world
// ---------------------------------------------------------------------------

/// Reference [`GridWorld`] backed by per-grid hash maps.
///
/// Used by the server binary and by tests; a deployment against a real
/// voxel engine supplies its own implementation instead.
pub struct MemoryGrid {
    grids: RwLock<HashMap<String, HashMap<GridPos, CellState>>>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self {
            grids: RwLock::new(HashMap::new()),
        }
    }

    /// Build a world containing the named grids, all empty.
    pub fn with_grids<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let world = Self::new();
        {
            let mut grids = world.grids.write();
            for name in names {
                grids.entry(name.into()).or_default();
            }
        }
        world
    }

    pub fn add_grid(&self, name: impl Into<String>) {
        self.grids.write().entry(name.into()).or_default();
    }

    /// Current state at a position, if any cell has been written there.
    pub fn cell(&self, grid: &str, pos: GridPos) -> Option<CellState> {
        self.grids.read().get(grid)?.get(&pos).copied()
    }

    /// Number of cells holding a state in the named grid.
    pub fn cell_count(&self, grid: &str) -> usize {
        self.grids.read().get(grid).map_or(0, HashMap::len)
    }
}

impl Default for MemoryGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl GridWorld for MemoryGrid {
    fn has_grid(&self, grid: &str) -> bool {
        self.grids.read().contains_key(grid)
    }

    fn set_cell(&self, grid: &str, pos: GridPos, state: CellState) {
        if let Some(cells) = self.grids.write().get_mut(grid) {
            cells.insert(pos, state);
        }
    }
}
