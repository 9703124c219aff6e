//! Core animator types shared across all modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Grid positions
// ---------------------------------------------------------------------------

/// Integer cell position within one grid. Used as a map key; two positions
/// are equal iff all three coordinates are equal.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{},{}]", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Cell states
// ---------------------------------------------------------------------------

/// Opaque identifier of what occupies a cell (e.g. a block-state id).
///
/// A pure value type: comparable, copyable, no identity beyond its encoded
/// value. The animator never interprets it; only the grid collaborator does.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellState(pub u64);

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatorStats {
    pub animations: usize,
    pub playing: usize,
    pub recording_actors: usize,
}

/// Listing summary for a single animation, safe to hand to the triggering
/// layer (no live handles).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationInfo {
    pub name: String,
    pub grid: String,
    pub frame_count: usize,
    pub frame_interval_ms: u64,
    pub playing: bool,
    pub autorun: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatorConfig {
    /// Directory animation records are persisted to.
    pub storage_dir: PathBuf,
    /// Persist an animation as soon as it is created.
    pub auto_save: bool,
    /// Frame interval used when the triggering layer does not supply one.
    pub default_frame_interval_ms: u64,
    /// Master switch for starting autorun animations after startup.
    pub autorun_enabled: bool,
    /// Grace period before autorun animations start, so the grid world can
    /// finish its own startup before being mutated.
    pub autorun_delay_secs: u64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("animations"),
            auto_save: true,
            default_frame_interval_ms: 500,
            autorun_enabled: true,
            autorun_delay_secs: 5,
        }
    }
}
