// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Undo/redo history for edit parameters.
//!
//! Commits are explicit: a live edit only changes `current`, while a commit
//! first pushes the pre-edit snapshot onto the undo stack and clears the redo
//! stack. Slider drags are bracketed by [`EditHistory::begin_drag`] and
//! [`EditHistory::end_drag`] so that one drag yields at most one undo step.

use std::collections::VecDeque;

use super::params::{EditParameters, ParamPatch};

/// Linear undo/redo history over full parameter snapshots.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    /// Undo stack (past states, most recent last)
    past: Vec<EditParameters>,
    /// Redo stack (future states, next redo first)
    future: VecDeque<EditParameters>,
    /// Live parameters
    current: EditParameters,
    /// Snapshot taken when a drag started
    drag_start: Option<EditParameters>,
}

impl EditHistory {
    /// Create a history starting from the default snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &EditParameters {
        &self.current
    }

    /// Merge `patch` into the live parameters, optionally committing an undo step.
    pub fn update(&mut self, patch: &ParamPatch, commit: bool) {
        if commit {
            self.commit(self.current);
        }
        self.current = self.current.merged(patch);
    }

    /// Restore the default snapshot as a single undoable step.
    pub fn reset(&mut self) {
        if self.current != EditParameters::default() {
            self.commit(self.current);
            self.current = EditParameters::default();
        }
    }

    /// Undo: restore previous state. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                self.future.push_front(self.current);
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Redo: restore next state. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.future.pop_front() {
            Some(next) => {
                self.past.push(self.current);
                self.current = next;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Remember the live snapshot at the start of a drag gesture.
    pub fn begin_drag(&mut self) {
        self.drag_start = Some(self.current);
    }

    /// Finish a drag gesture, committing once if anything changed.
    ///
    /// Compares whole snapshots, so an unrelated change made during the drag
    /// is folded into the same undo step.
    pub fn end_drag(&mut self) -> bool {
        match self.drag_start.take() {
            Some(start) if start != self.current => {
                self.commit(start);
                true
            }
            _ => false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    fn commit(&mut self, snapshot: EditParameters) {
        self.past.push(snapshot);
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brightness(v: f32) -> ParamPatch {
        ParamPatch {
            brightness: Some(v),
            ..Default::default()
        }
    }

    #[test]
    fn undo_and_redo_on_empty_stacks_are_noops() {
        let mut history = EditHistory::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.current(), EditParameters::default());
    }

    #[test]
    fn uncommitted_edit_creates_no_entry() {
        let mut history = EditHistory::new();
        history.update(&brightness(150.0), false);
        assert!(!history.can_undo());
        assert_eq!(history.current().brightness(), 150.0);
    }

    #[test]
    fn committed_edit_pushes_pre_edit_snapshot() {
        let mut history = EditHistory::new();
        history.update(&brightness(150.0), true);
        assert_eq!(history.undo_depth(), 1);

        assert!(history.undo());
        assert_eq!(history.current().brightness(), 100.0);
        assert!(history.redo());
        assert_eq!(history.current().brightness(), 150.0);
    }

    #[test]
    fn commit_after_undo_clears_redo_stack() {
        let mut history = EditHistory::new();
        history.update(&brightness(120.0), true);
        history.update(&brightness(140.0), true);
        history.undo();
        history.undo();
        assert_eq!(history.redo_depth(), 2);

        history.update(&brightness(90.0), true);
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.current().brightness(), 90.0);
    }

    #[test]
    fn drag_produces_single_undo_step() {
        let mut history = EditHistory::new();
        history.begin_drag();
        for v in [101.0, 110.0, 130.0, 160.0] {
            history.update(&brightness(v), false);
        }
        assert!(history.end_drag());
        assert_eq!(history.undo_depth(), 1);

        history.undo();
        assert_eq!(history.current().brightness(), 100.0);
    }

    #[test]
    fn drag_returning_to_start_value_commits_nothing() {
        let mut history = EditHistory::new();
        history.begin_drag();
        history.update(&brightness(130.0), false);
        history.update(&brightness(100.0), false);
        assert!(!history.end_drag());
        assert!(!history.can_undo());
        assert!(!history.is_dragging());
    }

    #[test]
    fn reset_is_one_undo_step() {
        let mut history = EditHistory::new();
        history.update(&brightness(150.0), true);
        history.reset();
        assert_eq!(*history.current(), EditParameters::default());
        assert_eq!(history.undo_depth(), 2);

        history.undo();
        assert_eq!(history.current().brightness(), 150.0);

        // resetting an already-default history adds nothing
        let mut fresh = EditHistory::new();
        fresh.reset();
        assert!(!fresh.can_undo());
    }

    fn patch_strategy() -> impl Strategy<Value = ParamPatch> {
        (0.0f32..200.0, 0.0f32..360.0, -60.0f32..60.0, any::<bool>()).prop_map(
            |(brightness, hue, tilt_x, sepia)| ParamPatch {
                brightness: Some(brightness),
                hue: Some(hue),
                tilt_x: Some(tilt_x),
                sepia: Some(sepia),
                ..Default::default()
            },
        )
    }

    proptest! {
        #[test]
        fn undo_redo_round_trip(patches in prop::collection::vec(patch_strategy(), 1..40)) {
            let mut history = EditHistory::new();
            for patch in &patches {
                history.update(patch, true);
            }
            let final_state = *history.current();

            for _ in 0..patches.len() {
                prop_assert!(history.undo());
            }
            prop_assert_eq!(*history.current(), EditParameters::default());
            prop_assert!(!history.can_undo());

            for _ in 0..patches.len() {
                prop_assert!(history.redo());
            }
            prop_assert_eq!(*history.current(), final_state);
            prop_assert!(!history.can_redo());
        }
    }
}
