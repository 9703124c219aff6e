//! The Animation entity: an ordered frame sequence plus playback metadata.

use crate::frame::AnimationFrame;
use crate::record::AnimationRecord;
use crate::types::AnimationInfo;

// ---------------------------------------------------------------------------
// Playback handle
// ---------------------------------------------------------------------------

/// Cancellation capability for a running playback timer.
///
/// An animation must know how to cancel its own playback without embedding a
/// concrete scheduler type; the scheduler supplies an implementation when it
/// starts the animation.
pub trait PlaybackHandle: Send {
    fn cancel(&self);
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// A named animation targeting one grid.
///
/// Invariants: `handle` is `Some` iff `playing`; the scheduler sets and
/// clears them together; `current_frame` stays within `0..frames.len()`
/// while playing (wrapped at the loop point).
pub struct Animation {
    name: String,
    grid: String,
    frames: Vec<AnimationFrame>,
    frame_interval_ms: u64,
    autorun: bool,
    playing: bool,
    current_frame: usize,
    handle: Option<Box<dyn PlaybackHandle>>,
}

impl Animation {
    pub fn new(name: impl Into<String>, grid: impl Into<String>, frame_interval_ms: u64) -> Self {
        Self {
            name: name.into(),
            grid: grid.into(),
            frames: Vec::new(),
            frame_interval_ms,
            autorun: false,
            playing: false,
            current_frame: 0,
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &str {
        &self.grid
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    pub fn set_frame_interval_ms(&mut self, frame_interval_ms: u64) {
        self.frame_interval_ms = frame_interval_ms.max(1);
    }

    pub fn add_frame(&mut self, frame: AnimationFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn autorun(&self) -> bool {
        self.autorun
    }

    pub fn set_autorun(&mut self, autorun: bool) {
        self.autorun = autorun;
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn set_current_frame(&mut self, index: usize) {
        self.current_frame = index;
    }

    /// Mark as playing and attach the scheduler's cancellation handle.
    pub fn begin_playback(&mut self, handle: Box<dyn PlaybackHandle>) {
        self.playing = true;
        self.handle = Some(handle);
    }

    /// Mark as stopped and detach the handle. The cursor is left where it
    /// was; a restart always resets it. Returns the handle so the caller can
    /// cancel the timer after releasing any locks.
    pub fn end_playback(&mut self) -> Option<Box<dyn PlaybackHandle>> {
        self.playing = false;
        self.handle.take()
    }

    pub fn info(&self) -> AnimationInfo {
        AnimationInfo {
            name: self.name.clone(),
            grid: self.grid.clone(),
            frame_count: self.frames.len(),
            frame_interval_ms: self.frame_interval_ms,
            playing: self.playing,
            autorun: self.autorun,
        }
    }

    // -----------------------------------------------------------------------
    // Record round-trip
    // -----------------------------------------------------------------------

    /// Serialize the persistent fields. Runtime state (playing flag, cursor,
    /// handle) never leaves the process.
    pub fn to_record(&self) -> AnimationRecord {
        AnimationRecord {
            name: self.name.clone(),
            grid: self.grid.clone(),
            frame_interval_ms: self.frame_interval_ms,
            autorun: self.autorun,
            frames: self.frames.iter().map(AnimationFrame::to_record).collect(),
        }
    }

    /// Rebuild an animation from its record. Returns the entity together
    /// with the number of cells dropped from frames during the lossy legacy
    /// upgrade.
    pub fn from_record(record: &AnimationRecord) -> (Self, usize) {
        let mut animation = Self::new(
            record.name.clone(),
            record.grid.clone(),
            record.frame_interval_ms,
        );
        animation.autorun = record.autorun;

        let mut dropped = 0;
        for frame_record in &record.frames {
            let (frame, frame_dropped) = AnimationFrame::from_record(frame_record);
            dropped += frame_dropped;
            animation.frames.push(frame);
        }

        (animation, dropped)
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("name", &self.name)
            .field("grid", &self.grid)
            .field("frames", &self.frames.len())
            .field("frame_interval_ms", &self.frame_interval_ms)
            .field("autorun", &self.autorun)
            .field("playing", &self.playing)
            .field("current_frame", &self.current_frame)
            .finish()
    }
}
