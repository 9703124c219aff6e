//! PlaybackScheduler – drives playing animations on their frame cadence.
//!
//! Each playing animation gets its own tokio interval task. Tasks interleave
//! on the runtime but a tick body runs under the store lock, so no two ticks
//! mutate animation state simultaneously and the frame/cursor fields need no
//! further locking. A task never holds the lock across an await point;
//! cancelling it therefore guarantees no further frame application once
//! [`PlaybackScheduler::stop_animation`] returns.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::animation::{Animation, PlaybackHandle};
use crate::error::{AnimatorError, Result};
use crate::grid::GridWorld;
use crate::store::AnimationStore;

// ---------------------------------------------------------------------------
// Task handle
// ---------------------------------------------------------------------------

/// [`PlaybackHandle`] over a spawned interval task.
struct TaskHandle(tokio::task::JoinHandle<()>);

impl PlaybackHandle for TaskHandle {
    fn cancel(&self) {
        self.0.abort();
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Starts and stops per-animation playback timers.
///
/// All methods expect to run inside a tokio runtime (they spawn tasks).
#[derive(Clone)]
pub struct PlaybackScheduler {
    store: Arc<Mutex<AnimationStore>>,
    world: Arc<dyn GridWorld>,
}

impl PlaybackScheduler {
    pub fn new(store: Arc<Mutex<AnimationStore>>, world: Arc<dyn GridWorld>) -> Self {
        Self { store, world }
    }

    /// Begin playback from frame 0.
    ///
    /// `override_interval_ms`, if supplied, replaces the animation's stored
    /// frame interval before the timer is registered. The first tick fires
    /// immediately; the k-th firing applies frame `k mod frame_count`.
    pub fn start_animation(&self, name: &str, override_interval_ms: Option<u64>) -> Result<()> {
        let mut store = self.store.lock();
        let animation = store
            .get_mut(name)
            .ok_or_else(|| AnimatorError::NotFound(name.to_string()))?;

        if animation.is_playing() {
            return Err(AnimatorError::AlreadyPlaying(name.to_string()));
        }

        if let Some(ms) = override_interval_ms {
            animation.set_frame_interval_ms(ms);
        }

        // Restarting always begins at the first frame, regardless of where a
        // previous run was stopped.
        animation.set_current_frame(0);

        let interval = Duration::from_millis(animation.frame_interval_ms());
        let task = tokio::spawn(run_playback(
            self.store.clone(),
            self.world.clone(),
            name.to_string(),
            interval,
        ));
        animation.begin_playback(Box::new(TaskHandle(task)));

        debug!("Started animation '{}' at {:?}/frame", name, interval);
        Ok(())
    }

    /// Stop playback. Returns `Ok(false)` if the animation exists but is not
    /// playing. The cursor is left untouched.
    pub fn stop_animation(&self, name: &str) -> Result<bool> {
        let handle = {
            let mut store = self.store.lock();
            let animation = store
                .get_mut(name)
                .ok_or_else(|| AnimatorError::NotFound(name.to_string()))?;

            if !animation.is_playing() {
                return Ok(false);
            }
            animation.end_playback()
        };

        // Cancel outside the lock: a tick already waiting on it will observe
        // the cleared playing flag and exit on its own.
        if let Some(handle) = handle {
            handle.cancel();
        }

        debug!("Stopped animation '{}'", name);
        Ok(true)
    }

    /// Stop every playing animation. Returns how many were stopped.
    pub fn stop_all(&self) -> usize {
        let names: Vec<String> = {
            let store = self.store.lock();
            store
                .iter()
                .filter(|a| a.is_playing())
                .map(|a| a.name().to_string())
                .collect()
        };

        let mut stopped = 0;
        for name in &names {
            match self.stop_animation(name) {
                Ok(true) => stopped += 1,
                Ok(false) => {}
                Err(e) => warn!("Failed to stop animation '{}': {}", name, e),
            }
        }
        stopped
    }

    /// After the given grace period, start every animation flagged for
    /// autorun. The delay gives the grid world time to finish its own
    /// startup before being mutated.
    pub fn start_autorun(&self, delay: Duration) {
        let pending = {
            let store = self.store.lock();
            store.iter().filter(|a| a.autorun()).count()
        };
        if pending == 0 {
            return;
        }

        info!(
            "Found {} animations marked to run on startup, starting in {:?}",
            pending, delay
        );

        let scheduler = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let names: Vec<String> = {
                let store = scheduler.store.lock();
                store
                    .iter()
                    .filter(|a| a.autorun())
                    .map(|a| a.name().to_string())
                    .collect()
            };

            let mut started = 0;
            for name in &names {
                match scheduler.start_animation(name, None) {
                    Ok(()) => started += 1,
                    Err(e) => warn!("Failed to autorun animation '{}': {}", name, e),
                }
            }

            if started > 0 {
                info!("Started {} autorun animations", started);
            }
        });
    }

    /// Advance one playback step: wrap the cursor at the end of the frame
    /// list, apply the current frame to the animation's grid, and move the
    /// cursor forward. An animation with zero frames is a no-op that never
    /// advances. The stopped-since-last-tick check belongs to the timer
    /// task, not this step.
    pub fn tick_animation(animation: &mut Animation, world: &dyn GridWorld) {
        let count = animation.frame_count();
        if count == 0 {
            return;
        }

        let mut index = animation.current_frame();
        if index >= count {
            index = 0;
        }

        animation.frames()[index].apply(world, animation.grid());
        animation.set_current_frame(index + 1);
    }
}

// ---------------------------------------------------------------------------
// Timer task
// ---------------------------------------------------------------------------

/// Body of one animation's playback timer.
///
/// Exits when the animation is stopped or removed; the lock is held only
/// long enough to run a tick, then released before the next await.
async fn run_playback(
    store: Arc<Mutex<AnimationStore>>,
    world: Arc<dyn GridWorld>,
    name: String,
    interval: Duration,
) {
    let mut timer = tokio::time::interval(interval);
    loop {
        timer.tick().await;

        let keep_going = {
            let mut store = store.lock();
            match store.get_mut(&name) {
                Some(animation) if animation.is_playing() => {
                    PlaybackScheduler::tick_animation(animation, world.as_ref());
                    true
                }
                _ => false,
            }
        };

        if !keep_going {
            break;
        }
    }
}
