//! Recording subsystem: per-actor capture sessions and their registry.
//!
//! A session accumulates a working diff buffer between frame boundaries.
//! Undo/redo operates on *whole working-buffer snapshots*, not individual
//! cell edits; history size is bounded by the number of frame-boundary
//! actions, and reapplying a snapshot is a plain buffer replay.

use std::collections::HashMap;

use crate::frame::AnimationFrame;
use crate::grid::GridWorld;
use crate::types::{CellState, GridPos};

// ---------------------------------------------------------------------------
// Start-frame outcome
// ---------------------------------------------------------------------------

/// What a `start_frame` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFrame {
    /// The session was idle; recording has begun with an empty buffer.
    Began,
    /// The working buffer was captured into a new frame; `frames` is the
    /// committed frame count afterwards.
    Captured { frames: usize },
}

// ---------------------------------------------------------------------------
// Recorder session
// ---------------------------------------------------------------------------

/// Recording state for one actor.
///
/// While recording, the session is bound to the grid it started on. The redo
/// stack is only valid immediately after an undo: any edit-bearing action
/// (a raw cell change, or a capture of a non-empty buffer) clears it.
#[derive(Debug, Default)]
pub struct RecorderSession {
    recording: bool,
    grid: Option<String>,
    frames: Vec<AnimationFrame>,
    working: HashMap<GridPos, CellState>,
    undo_stack: Vec<HashMap<GridPos, CellState>>,
    redo_stack: Vec<HashMap<GridPos, CellState>>,
}

impl RecorderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Grid this session is bound to, while recording.
    pub fn grid(&self) -> Option<&str> {
        self.grid.as_deref()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of uncommitted edits in the working buffer.
    pub fn pending_changes(&self) -> usize {
        self.working.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Begin recording, or capture the working buffer into a new frame.
    ///
    /// On capture the buffer is pushed onto the undo stack first (only if
    /// non-empty, which also invalidates redo history), then converted into
    /// a frame and cleared. An empty buffer still yields an empty frame.
    pub fn start_frame(&mut self, grid: &str) -> StartFrame {
        if !self.recording {
            self.reset();
            self.recording = true;
            self.grid = Some(grid.to_string());
            return StartFrame::Began;
        }

        self.capture_frame();
        StartFrame::Captured {
            frames: self.frames.len(),
        }
    }

    /// Record one cell change. No-op unless recording; last write wins per
    /// position per frame boundary. Invalidates redo history.
    pub fn record_change(&mut self, pos: GridPos, state: CellState) {
        if !self.recording {
            return;
        }
        self.working.insert(pos, state);
        self.redo_stack.clear();
    }

    /// Finish recording: flush a non-empty working buffer into a final
    /// frame, hand back the committed frames, and reset to idle.
    ///
    /// Guarding against an idle session or zero frames is the caller's
    /// responsibility.
    pub fn complete(&mut self) -> Vec<AnimationFrame> {
        if !self.working.is_empty() {
            self.capture_frame();
        }

        let frames = std::mem::take(&mut self.frames);
        self.reset();
        frames
    }

    /// Discard everything and return to idle. Returns whether a recording
    /// was actually in progress.
    pub fn cancel(&mut self) -> bool {
        let was_recording = self.recording;
        self.reset();
        was_recording
    }

    /// Restore the previous working-buffer snapshot and reapply it to the
    /// world for immediate visual feedback. Returns false with no history.
    pub fn undo(&mut self, world: &dyn GridWorld) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };

        if !self.working.is_empty() {
            self.redo_stack.push(std::mem::take(&mut self.working));
        }

        self.working = snapshot;
        self.apply_working(world);
        true
    }

    /// Symmetric to [`RecorderSession::undo`], moving in the other direction.
    pub fn redo(&mut self, world: &dyn GridWorld) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };

        if !self.working.is_empty() {
            self.undo_stack.push(std::mem::take(&mut self.working));
        }

        self.working = snapshot;
        self.apply_working(world);
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn capture_frame(&mut self) {
        if !self.working.is_empty() {
            self.undo_stack.push(self.working.clone());
            self.redo_stack.clear();
        }

        let cells = std::mem::take(&mut self.working);
        self.frames.push(AnimationFrame::from_cells(cells));
    }

    fn apply_working(&self, world: &dyn GridWorld) {
        let Some(grid) = self.grid.as_deref() else {
            return;
        };
        for (pos, state) in &self.working {
            world.set_cell(grid, *pos, *state);
        }
    }

    fn reset(&mut self) {
        self.recording = false;
        self.grid = None;
        self.frames.clear();
        self.working.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-actor session registry, created lazily and torn down on disconnect.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, RecorderSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `actor`, creating an idle one if absent.
    pub fn session(&mut self, actor: &str) -> &mut RecorderSession {
        self.sessions.entry(actor.to_string()).or_default()
    }

    pub fn get(&self, actor: &str) -> Option<&RecorderSession> {
        self.sessions.get(actor)
    }

    /// Drop an actor's session, cancelling any recording in progress first
    /// so no orphaned buffer or history survives the disconnect.
    pub fn remove(&mut self, actor: &str) {
        if let Some(mut session) = self.sessions.remove(actor) {
            session.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of actors with a recording in progress.
    pub fn recording_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_recording()).count()
    }
}
