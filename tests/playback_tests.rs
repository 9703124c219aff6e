//! PlaybackScheduler tests – tick semantics and timer lifecycle

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;
    use voxel_animator::{
        animation::Animation,
        error::AnimatorError,
        frame::AnimationFrame,
        grid::GridWorld,
        scheduler::PlaybackScheduler,
        store::AnimationStore,
        types::{CellState, GridPos},
    };

    /// Grid world that records every cell write in call order.
    #[derive(Default)]
    struct RecordingGrid {
        log: Mutex<Vec<(GridPos, CellState)>>,
    }

    impl RecordingGrid {
        fn states(&self) -> Vec<u64> {
            self.log.lock().iter().map(|(_, state)| state.0).collect()
        }
    }

    impl GridWorld for RecordingGrid {
        fn has_grid(&self, grid: &str) -> bool {
            grid == "main"
        }

        fn set_cell(&self, _grid: &str, pos: GridPos, state: CellState) {
            self.log.lock().push((pos, state));
        }
    }

    /// Frame `k` writes state `k + 1` at the origin.
    fn numbered_frame(k: u64) -> AnimationFrame {
        let mut frame = AnimationFrame::new();
        frame.add_cell_state(GridPos::new(0, 0, 0), CellState(k + 1));
        frame
    }

    fn make_scheduler(
        frames: usize,
        interval_ms: u64,
    ) -> (PlaybackScheduler, Arc<Mutex<AnimationStore>>, Arc<RecordingGrid>) {
        let dir = tempdir().unwrap();
        let mut store = AnimationStore::open(dir.path(), false).unwrap();
        let animation = store.create_animation("door", "main", interval_ms).unwrap();
        for k in 0..frames {
            animation.add_frame(numbered_frame(k as u64));
        }

        let store = Arc::new(Mutex::new(store));
        let world = Arc::new(RecordingGrid::default());
        let scheduler = PlaybackScheduler::new(store.clone(), world.clone());
        (scheduler, store, world)
    }

    // -----------------------------------------------------------------------
    // Tick step semantics (driven synchronously)
    // -----------------------------------------------------------------------

    #[test]
    fn tick_applies_frame_k_mod_n() {
        let world = RecordingGrid::default();
        let mut animation = Animation::new("door", "main", 10);
        for k in 0..3 {
            animation.add_frame(numbered_frame(k));
        }

        for _ in 0..7 {
            PlaybackScheduler::tick_animation(&mut animation, &world);
        }

        // Frames loop 0,1,2,0,1,2,0; states are index + 1.
        assert_eq!(world.states(), vec![1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(animation.current_frame(), 1);
    }

    #[test]
    fn tick_with_zero_frames_never_advances() {
        let world = RecordingGrid::default();
        let mut animation = Animation::new("door", "main", 10);

        for _ in 0..5 {
            PlaybackScheduler::tick_animation(&mut animation, &world);
        }

        assert!(world.states().is_empty());
        assert_eq!(animation.current_frame(), 0);
    }

    // -----------------------------------------------------------------------
    // Start / stop
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn playback_applies_frames_on_interval() {
        let (scheduler, store, world) = make_scheduler(3, 10);

        scheduler.start_animation("door", None).unwrap();
        assert!(store.lock().get("door").unwrap().is_playing());
        assert_eq!(store.lock().get("door").unwrap().current_frame(), 0);

        // First firing is immediate, then every 10ms: t = 0, 10, 20, 30.
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(world.states(), vec![1, 2, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_frame_application() {
        let (scheduler, store, world) = make_scheduler(3, 10);

        scheduler.start_animation("door", None).unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;

        assert!(scheduler.stop_animation("door").unwrap());
        assert!(!store.lock().get("door").unwrap().is_playing());

        let applied = world.states().len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        // No tick lands after stop returns.
        assert_eq!(world.states().len(), applied);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_always_begins_at_frame_zero() {
        let (scheduler, store, world) = make_scheduler(3, 10);

        scheduler.start_animation("door", None).unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;
        scheduler.stop_animation("door").unwrap();

        // Stopping leaves the cursor wherever it was.
        assert_ne!(store.lock().get("door").unwrap().current_frame(), 0);

        scheduler.start_animation("door", None).unwrap();
        assert_eq!(store.lock().get("door").unwrap().current_frame(), 0);

        tokio::time::sleep(Duration::from_millis(5)).await;
        // The first applied frame after a restart is frame 0 again.
        assert_eq!(world.states().last(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_fails_already_playing() {
        let (scheduler, _store, _world) = make_scheduler(3, 10);

        scheduler.start_animation("door", None).unwrap();
        let err = scheduler.start_animation("door", None).unwrap_err();
        assert!(matches!(err, AnimatorError::AlreadyPlaying(name) if name == "door"));
    }

    #[tokio::test(start_paused = true)]
    async fn start_unknown_name_fails() {
        let (scheduler, _store, _world) = make_scheduler(3, 10);

        let err = scheduler.start_animation("ghost", None).unwrap_err();
        assert!(matches!(err, AnimatorError::NotFound(name) if name == "ghost"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_not_playing_is_a_no_op() {
        let (scheduler, _store, _world) = make_scheduler(3, 10);

        assert!(!scheduler.stop_animation("door").unwrap());
        assert!(matches!(
            scheduler.stop_animation("ghost").unwrap_err(),
            AnimatorError::NotFound(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_override_replaces_stored_interval() {
        let (scheduler, store, world) = make_scheduler(3, 10);

        scheduler.start_animation("door", Some(50)).unwrap();
        assert_eq!(store.lock().get("door").unwrap().frame_interval_ms(), 50);

        // Two firings in 60ms at the overridden cadence: t = 0, 50.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(world.states(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn playing_empty_animation_applies_nothing() {
        let (scheduler, store, world) = make_scheduler(0, 10);

        scheduler.start_animation("door", None).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(world.states().is_empty());
        let store = store.lock();
        let animation = store.get("door").unwrap();
        assert!(animation.is_playing());
        assert_eq!(animation.current_frame(), 0);
    }

    // -----------------------------------------------------------------------
    // Autorun
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn autorun_starts_flagged_animations_after_delay() {
        let (scheduler, store, world) = make_scheduler(3, 10);
        {
            let mut store = store.lock();
            store.get_mut("door").unwrap().set_autorun(true);
            let idle = store.create_animation("idle", "main", 10).unwrap();
            idle.add_frame(numbered_frame(9));
        }

        scheduler.start_autorun(Duration::from_secs(2));

        // Nothing starts before the grace period elapses.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!store.lock().get("door").unwrap().is_playing());
        assert!(world.states().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.lock().get("door").unwrap().is_playing());
        assert!(!store.lock().get("idle").unwrap().is_playing());
        assert!(!world.states().is_empty());
    }
}
