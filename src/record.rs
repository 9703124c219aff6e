//! Persisted animation records.
//!
//! This module owns **every shape that crosses the storage boundary**
//! between the animator and durable storage. One record per animation,
//! keyed by `name`.
//!
//! ## Record layout
//!
//! | Field               | Type            | Notes                           |
//! |---------------------|-----------------|---------------------------------|
//! | `name`              | string          | unique key, stable              |
//! | `grid`              | string          | target grid identity            |
//! | `frame_interval_ms` | integer         | playback cadence                |
//! | `autorun`           | bool            | missing in legacy records → false |
//! | `frames`            | `[FrameRecord]` | ordered, sparse diffs           |
//!
//! ## Design rules
//!
//! 1. Every struct is `Serialize + Deserialize` with snake_case JSON.
//! 2. No live state leaks out (playing flag, cursor, playback handles are
//!    runtime-only and never persisted).
//! 3. Legacy split cell encodings (`id` + `meta` instead of `state`) are
//!    recognised so loads can drop them; they are never written back.

use serde::{Deserialize, Serialize};

use crate::types::CellState;

/// Extension of current animation records inside the storage directory.
pub const RECORD_EXT: &str = "json";

/// Extension of legacy records, upgraded in place on load.
pub const LEGACY_RECORD_EXT: &str = "anim";

// ---------------------------------------------------------------------------
// Cell record
// ---------------------------------------------------------------------------

/// One changed cell within a frame.
///
/// Current records carry `state`; legacy records carry a split `id` + `meta`
/// pair that cannot be reliably remapped to a state id. Loads drop such
/// cells rather than guessing a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CellState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<u64>,
}

impl CellRecord {
    pub fn new(x: i32, y: i32, z: i32, state: CellState) -> Self {
        Self {
            x,
            y,
            z,
            state: Some(state),
            id: None,
            meta: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame record
// ---------------------------------------------------------------------------

/// A frame as persisted: a flat list of changed cells, order irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub cells: Vec<CellRecord>,
}

// ---------------------------------------------------------------------------
// Animation record
// ---------------------------------------------------------------------------

/// The full persisted entity. `name`, `grid`, `frame_interval_ms` and
/// `frames` are required; a record missing any of them is malformed and
/// skipped at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationRecord {
    pub name: String,
    pub grid: String,
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub autorun: bool,
    pub frames: Vec<FrameRecord>,
}
