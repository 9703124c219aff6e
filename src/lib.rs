//! Voxel Animator Engine
//!
//! Records sequences of discrete cell changes in a sparse 3D voxel grid as
//! ordered frames, persists them as named animations, and replays them on a
//! fixed cadence, looping until stopped.
//!
//! ## Architecture
//!
//! ```text
//! AnimatorService  (service.rs)  ← recording + lifecycle + playback facade
//!   ├── SessionRegistry  (recorder.rs)  ← per-actor capture buffers
//!   ├── AnimationStore   (store.rs)     ← entity set + persistence
//!   └── PlaybackScheduler (scheduler.rs)← per-animation tick tasks
//!         └── GridWorld  (grid.rs)      ← cell-mutation collaborator
//! ```
//!
//! Cell edits flow into a [`recorder::RecorderSession`] working buffer; each
//! `start_frame` turns the buffer into a sparse [`frame::AnimationFrame`];
//! completion hands the frame list to the [`store::AnimationStore`], which
//! persists it. Independently, the [`scheduler::PlaybackScheduler`] applies
//! frames back into the [`grid::GridWorld`] on each animation's interval.

// Record types are always available (no server feature needed).
pub mod error;
pub mod record;
pub mod types;

// Runtime modules require the `server` feature.
#[cfg(feature = "server")]
pub mod animation;
#[cfg(feature = "server")]
pub mod frame;
#[cfg(feature = "server")]
pub mod grid;
#[cfg(feature = "server")]
pub mod recorder;
#[cfg(feature = "server")]
pub mod scheduler;
#[cfg(feature = "server")]
pub mod service;
#[cfg(feature = "server")]
pub mod store;

// Convenience re-exports (server only)
#[cfg(feature = "server")]
pub use animation::{Animation, PlaybackHandle};
#[cfg(feature = "server")]
pub use frame::AnimationFrame;
#[cfg(feature = "server")]
pub use grid::{GridWorld, MemoryGrid};
#[cfg(feature = "server")]
pub use recorder::{RecorderSession, SessionRegistry, StartFrame};
#[cfg(feature = "server")]
pub use scheduler::PlaybackScheduler;
#[cfg(feature = "server")]
pub use service::{AnimatorService, TriggerKind};
#[cfg(feature = "server")]
pub use store::{AnimationStore, LoadReport};
pub use error::{AnimatorError, Result};
pub use types::{AnimationInfo, AnimatorConfig, AnimatorStats, CellState, GridPos};
