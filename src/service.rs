//! AnimatorService – recording, lifecycle, and playback behind one facade.
//!
//! ## Call contract (triggering layer → service)
//!
//! | Call                       | Errors                                   |
//! |----------------------------|------------------------------------------|
//! | `start_frame`              | `UnresolvedGrid`, `AlreadyRecording`     |
//! | `record_change`            | *(none; no-op unless recording)*        |
//! | `complete_recording`       | `NotRecording`, `DuplicateName`, `NoFramesRecorded` |
//! | `cancel_recording`         | *(none)*                                 |
//! | `undo` / `redo`            | *(bool: was there history)*              |
//! | `create_animation`         | `UnresolvedGrid`, `DuplicateName`        |
//! | `delete_animation`         | `NotFound`                               |
//! | `set_autorun`              | `NotFound`                               |
//! | `start_animation`          | `NotFound`, `AlreadyPlaying`             |
//! | `stop_animation`           | `NotFound` *(Ok(false) if not playing)*  |
//!
//! Locks are taken in a fixed order (sessions, then store) and never held
//! across an await; the scheduler manages its own store access.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AnimatorError, Result};
use crate::grid::GridWorld;
use crate::recorder::{SessionRegistry, StartFrame};
use crate::scheduler::PlaybackScheduler;
use crate::store::{AnimationStore, LoadReport};
use crate::types::{AnimationInfo, AnimatorConfig, AnimatorStats, CellState, GridPos};

// ---------------------------------------------------------------------------
// Trigger events
// ---------------------------------------------------------------------------

/// External trigger kinds dispatched into the recording API. The service
/// never inspects the item or UI element that produced the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriggerKind {
    /// Capture the working buffer as the next frame (or begin recording).
    NextFrame,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct AnimatorService {
    config: AnimatorConfig,
    world: Arc<dyn GridWorld>,
    store: Arc<Mutex<AnimationStore>>,
    sessions: Mutex<SessionRegistry>,
    scheduler: PlaybackScheduler,
}

impl AnimatorService {
    pub fn new(config: AnimatorConfig, world: Arc<dyn GridWorld>) -> Result<Self> {
        let store = Arc::new(Mutex::new(AnimationStore::open(
            config.storage_dir.clone(),
            config.auto_save,
        )?));
        let scheduler = PlaybackScheduler::new(store.clone(), world.clone());

        Ok(Self {
            config,
            world,
            store,
            sessions: Mutex::new(SessionRegistry::new()),
            scheduler,
        })
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Startup / shutdown
    // -----------------------------------------------------------------------

    /// Load every persisted animation, upgrading legacy records in place.
    pub fn load_all(&self) -> Result<LoadReport> {
        self.store.lock().load_all(self.world.as_ref())
    }

    /// Schedule autorun animations to start after the configured delay.
    /// Honors the autorun master switch.
    pub fn start_autorun(&self) {
        if !self.config.autorun_enabled {
            info!("Autorun is disabled, skipping autorun animations");
            return;
        }
        self.scheduler
            .start_autorun(Duration::from_secs(self.config.autorun_delay_secs));
    }

    /// Stop all playing animations, then persist everything.
    pub fn shutdown(&self) {
        let stopped = self.scheduler.stop_all();
        if stopped > 0 {
            info!("Stopped {} playing animations", stopped);
        }
        self.store.lock().save_all();
        info!("Animator shut down");
    }

    pub fn stats(&self) -> AnimatorStats {
        // One lock at a time, respecting the sessions-then-store order.
        let recording_actors = self.sessions.lock().recording_count();
        let store = self.store.lock();
        AnimatorStats {
            animations: store.len(),
            playing: store.playing_count(),
            recording_actors,
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Begin recording on `grid`, or capture the working buffer as the next
    /// frame. A session stays bound to the grid it started on.
    pub fn start_frame(&self, actor: &str, grid: &str) -> Result<StartFrame> {
        let mut sessions = self.sessions.lock();
        let session = sessions.session(actor);

        if session.is_recording() {
            if let Some(bound) = session.grid() {
                if bound != grid {
                    return Err(AnimatorError::AlreadyRecording(
                        actor.to_string(),
                        bound.to_string(),
                    ));
                }
            }
        } else if !self.world.has_grid(grid) {
            return Err(AnimatorError::UnresolvedGrid(grid.to_string()));
        }

        let outcome = session.start_frame(grid);
        match outcome {
            StartFrame::Began => debug!("Actor '{}' started recording on '{}'", actor, grid),
            StartFrame::Captured { frames } => {
                debug!("Actor '{}' captured frame {}", actor, frames)
            }
        }
        Ok(outcome)
    }

    /// Record one cell change for the actor's session. No-op unless the
    /// actor is recording.
    pub fn record_change(&self, actor: &str, pos: GridPos, state: CellState) {
        self.sessions.lock().session(actor).record_change(pos, state);
    }

    /// Finish the actor's recording and persist it as a new animation.
    ///
    /// The duplicate-name check runs before the session is consumed, so a
    /// collision leaves the recording (and its undo history) intact.
    pub fn complete_recording(&self, actor: &str, name: &str) -> Result<AnimationInfo> {
        let mut sessions = self.sessions.lock();
        let session = sessions.session(actor);

        if !session.is_recording() {
            return Err(AnimatorError::NotRecording(actor.to_string()));
        }

        let mut store = self.store.lock();
        if store.contains(name) {
            return Err(AnimatorError::DuplicateName(name.to_string()));
        }

        if session.frame_count() == 0 && session.pending_changes() == 0 {
            // An empty recording also resets the session to idle.
            session.cancel();
            return Err(AnimatorError::NoFramesRecorded);
        }

        let Some(grid) = session.grid().map(str::to_string) else {
            return Err(AnimatorError::NotRecording(actor.to_string()));
        };
        let frames = session.complete();

        let info = {
            let animation =
                store.create_animation(name, &grid, self.config.default_frame_interval_ms)?;
            for frame in frames {
                animation.add_frame(frame);
            }
            animation.info()
        };

        // Persist the frames on top of the (possibly auto-saved) empty record.
        if let Err(e) = store.save_animation(name) {
            warn!("Failed to save animation '{}': {}", name, e);
        }

        info!(
            "Actor '{}' completed animation '{}' with {} frames",
            actor, name, info.frame_count
        );
        Ok(info)
    }

    /// Discard the actor's recording. Returns whether one was in progress.
    pub fn cancel_recording(&self, actor: &str) -> bool {
        let cancelled = self.sessions.lock().session(actor).cancel();
        if cancelled {
            debug!("Actor '{}' cancelled recording", actor);
        }
        cancelled
    }

    pub fn is_recording(&self, actor: &str) -> bool {
        self.sessions
            .lock()
            .get(actor)
            .is_some_and(|s| s.is_recording())
    }

    /// Restore the previous working-buffer snapshot, reapplying it to the
    /// grid. Returns false if there is nothing to undo.
    pub fn undo(&self, actor: &str) -> bool {
        self.sessions.lock().session(actor).undo(self.world.as_ref())
    }

    /// Restore the last undone snapshot. Returns false if there is nothing
    /// to redo.
    pub fn redo(&self, actor: &str) -> bool {
        self.sessions.lock().session(actor).redo(self.world.as_ref())
    }

    /// Disconnect hook: cancel any recording and drop the actor's session.
    pub fn remove_actor(&self, actor: &str) {
        self.sessions.lock().remove(actor);
    }

    /// External trigger event (e.g. a dedicated in-world item) dispatched
    /// into the recording API.
    pub fn on_trigger_used(
        &self,
        actor: &str,
        grid: &str,
        kind: TriggerKind,
    ) -> Result<StartFrame> {
        match kind {
            TriggerKind::NextFrame => self.start_frame(actor, grid),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create an empty animation targeting `grid`.
    pub fn create_animation(
        &self,
        name: &str,
        grid: &str,
        frame_interval_ms: u64,
    ) -> Result<AnimationInfo> {
        if !self.world.has_grid(grid) {
            return Err(AnimatorError::UnresolvedGrid(grid.to_string()));
        }

        let mut store = self.store.lock();
        let info = store.create_animation(name, grid, frame_interval_ms)?.info();
        info!("Created animation '{}' on grid '{}'", name, grid);
        Ok(info)
    }

    /// Delete an animation, stopping it first if it is playing.
    pub fn delete_animation(&self, name: &str) -> Result<()> {
        self.scheduler.stop_animation(name)?;
        self.store.lock().delete_animation(name)?;
        info!("Deleted animation '{}'", name);
        Ok(())
    }

    pub fn animation(&self, name: &str) -> Option<AnimationInfo> {
        self.store.lock().get(name).map(|a| a.info())
    }

    /// Enumerate all animations. Order is not semantically meaningful.
    pub fn list_animations(&self) -> Vec<AnimationInfo> {
        self.store.lock().iter().map(|a| a.info()).collect()
    }

    /// Flag an animation to start automatically after startup, and persist
    /// the change immediately.
    pub fn set_autorun(&self, name: &str, autorun: bool) -> Result<()> {
        let mut store = self.store.lock();
        store
            .get_mut(name)
            .ok_or_else(|| AnimatorError::NotFound(name.to_string()))?
            .set_autorun(autorun);
        store.save_animation(name)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Begin playback from frame 0, optionally overriding the stored frame
    /// interval.
    pub fn start_animation(&self, name: &str, override_interval_ms: Option<u64>) -> Result<()> {
        self.scheduler.start_animation(name, override_interval_ms)
    }

    /// Stop playback. `Ok(false)` if the animation was not playing.
    pub fn stop_animation(&self, name: &str) -> Result<bool> {
        self.scheduler.stop_animation(name)
    }
}
