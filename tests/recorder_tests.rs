//! RecorderSession unit tests

#[cfg(test)]
mod tests {
    use voxel_animator::{
        grid::MemoryGrid,
        recorder::{RecorderSession, SessionRegistry, StartFrame},
        types::{CellState, GridPos},
    };

    fn make_world() -> MemoryGrid {
        MemoryGrid::with_grids(["main"])
    }

    fn pos(x: i32, y: i32, z: i32) -> GridPos {
        GridPos::new(x, y, z)
    }

    // -----------------------------------------------------------------------
    // Recording lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn first_start_frame_begins_recording() {
        let mut session = RecorderSession::new();
        assert!(!session.is_recording());

        assert_eq!(session.start_frame("main"), StartFrame::Began);
        assert!(session.is_recording());
        assert_eq!(session.grid(), Some("main"));
        assert_eq!(session.frame_count(), 0);
    }

    #[test]
    fn changes_before_recording_are_ignored() {
        let mut session = RecorderSession::new();
        session.record_change(pos(0, 0, 0), CellState(1));
        assert_eq!(session.pending_changes(), 0);
    }

    #[test]
    fn capture_builds_frame_from_working_buffer() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.record_change(pos(1, 0, 0), CellState(2));

        let outcome = session.start_frame("main");
        assert_eq!(outcome, StartFrame::Captured { frames: 1 });
        assert_eq!(session.pending_changes(), 0);

        let frames = session.complete();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].cell_count(), 2);
        assert_eq!(frames[0].state_at(pos(0, 0, 0)), Some(CellState(1)));
        assert_eq!(frames[0].state_at(pos(1, 0, 0)), Some(CellState(2)));
    }

    #[test]
    fn last_write_wins_per_position() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.record_change(pos(0, 0, 0), CellState(2));
        session.record_change(pos(0, 0, 0), CellState(3));
        session.start_frame("main");

        let frames = session.complete();
        assert_eq!(frames[0].cell_count(), 1);
        assert_eq!(frames[0].state_at(pos(0, 0, 0)), Some(CellState(3)));
    }

    #[test]
    fn capture_with_empty_buffer_yields_empty_frame() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        assert_eq!(session.start_frame("main"), StartFrame::Captured { frames: 1 });

        let frames = session.complete();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    #[test]
    fn complete_flushes_pending_buffer_into_final_frame() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");
        session.record_change(pos(1, 0, 0), CellState(2));

        // One committed frame plus the pending buffer.
        let frames = session.complete();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].state_at(pos(1, 0, 0)), Some(CellState(2)));
        assert!(!session.is_recording());
    }

    #[test]
    fn complete_with_empty_buffer_adds_no_frame() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");

        let frames = session.complete();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn complete_resets_session() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.complete();

        assert!(!session.is_recording());
        assert_eq!(session.grid(), None);
        assert_eq!(session.frame_count(), 0);
        assert_eq!(session.pending_changes(), 0);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
    }

    #[test]
    fn cancel_discards_everything() {
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");

        assert!(session.cancel());
        assert!(!session.is_recording());
        assert_eq!(session.frame_count(), 0);

        // Cancelling an idle session reports that nothing was in progress.
        assert!(!session.cancel());
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    #[test]
    fn undo_with_no_history_fails() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        assert!(!session.undo(&world));
    }

    #[test]
    fn undo_restores_previous_snapshot_and_applies_it() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.record_change(pos(1, 0, 0), CellState(2));
        session.start_frame("main");

        // New edit on top of the captured frame.
        session.record_change(pos(0, 0, 0), CellState(3));

        assert!(session.undo(&world));
        // The captured buffer is the restored snapshot, reapplied to the grid.
        assert_eq!(session.pending_changes(), 2);
        assert_eq!(world.cell("main", pos(0, 0, 0)), Some(CellState(1)));
        assert_eq!(world.cell("main", pos(1, 0, 0)), Some(CellState(2)));
    }

    #[test]
    fn undo_then_redo_restores_pre_undo_buffer() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(3));

        assert!(session.undo(&world));
        assert!(session.redo(&world));

        assert_eq!(session.pending_changes(), 1);
        assert_eq!(world.cell("main", pos(0, 0, 0)), Some(CellState(3)));
        assert!(session.can_undo());
        assert!(!session.can_redo());
    }

    #[test]
    fn redo_with_no_history_fails() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        assert!(!session.redo(&world));
    }

    #[test]
    fn edit_invalidates_redo_history() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(2));

        assert!(session.undo(&world));
        assert!(session.can_redo());

        // A raw edit is a new action: redo history is no longer valid.
        session.record_change(pos(5, 5, 5), CellState(9));
        assert!(!session.can_redo());
        assert!(!session.redo(&world));
    }

    #[test]
    fn capture_invalidates_redo_history() {
        let world = make_world();
        let mut session = RecorderSession::new();
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(1));
        session.start_frame("main");
        session.record_change(pos(0, 0, 0), CellState(2));

        assert!(session.undo(&world));
        assert!(session.can_redo());

        // The restored buffer is non-empty; capturing it is a new action.
        session.start_frame("main");
        assert!(!session.can_redo());
    }

    // -----------------------------------------------------------------------
    // Session registry
    // -----------------------------------------------------------------------

    #[test]
    fn registry_creates_sessions_lazily() {
        let mut registry = SessionRegistry::new();
        assert!(registry.is_empty());

        registry.session("alice").start_frame("main");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.recording_count(), 1);

        registry.session("bob");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.recording_count(), 1);
    }

    #[test]
    fn registry_remove_cancels_recording_first() {
        let mut registry = SessionRegistry::new();
        registry.session("alice").start_frame("main");
        registry
            .session("alice")
            .record_change(GridPos::new(0, 0, 0), CellState(1));

        registry.remove("alice");
        assert!(registry.get("alice").is_none());

        // A fresh session for the same actor starts idle.
        assert!(!registry.session("alice").is_recording());
    }
}
