//! Selection state machine.
//!
//! The single authority for the current `SelectionRect` and
//! `InteractionState`. Pure transition logic: no DOM, no listeners, no
//! rendering. Every transition checks the current mode first and returns
//! `PageSnapError::InvalidTransition` without touching state when called from
//! the wrong mode.
//!
//! ```text
//! idle --begin_selection--> selecting --end_selection--> selected
//!  ^                            |  (degenerate)              |  ^
//!  +----------------------------+         begin_resize/move  |  | end_resize
//!  |                                                         v  |
//!  +------------- cancel ------------------------------- resizing
//!  |
//!  +-- complete_capture -- capturing <--commit-- selected
//!                              |
//!                              +--fail_capture--> selected
//! ```

use crate::error::{OptionExt, PageSnapError, PageSnapResult};

use super::coords::PagePoint;
use super::types::{Grip, HandleKey, InteractionState, SelectionRect, MIN_SELECTION_SIZE};

/// State of an in-progress handle or body drag.
#[derive(Debug, Clone, Copy)]
struct Adjustment {
    /// Grip the drag started on
    grip: Grip,
    /// Grip currently under the pointer (differs from `grip` once the
    /// rectangle inverted)
    effective: Grip,
    /// Pointer position when the drag started
    start: PagePoint,
    /// Rectangle when the drag started (for delta calculation)
    original: SelectionRect,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    state: InteractionState,
    rect: Option<SelectionRect>,
    /// Fixed corner of a selection being dragged out
    anchor: Option<PagePoint>,
    adjustment: Option<Adjustment>,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn rect(&self) -> Option<SelectionRect> {
        self.rect
    }

    /// Grip being dragged, relabelled after inversions.
    pub fn active_grip(&self) -> Option<Grip> {
        self.adjustment.map(|a| a.effective)
    }

    fn require(&self, action: &'static str, allowed: &[InteractionState]) -> PageSnapResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            log::debug!("[SELECTION] rejected '{}' while {}", action, self.state);
            Err(PageSnapError::invalid_transition(action, self.state))
        }
    }

    fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.rect = None;
        self.anchor = None;
        self.adjustment = None;
    }

    // ------------------------------------------------------------------
    // Drag to create
    // ------------------------------------------------------------------

    /// Start a new rectangle at the pointer. Valid only from `idle`.
    pub fn begin_selection(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<()> {
        self.require("begin a selection", &[InteractionState::Idle])?;
        self.anchor = Some(PagePoint::new(page_x, page_y));
        self.rect = Some(SelectionRect::new(page_x, page_y, 0.0, 0.0));
        self.state = InteractionState::Selecting;
        Ok(())
    }

    /// Stretch the rectangle from the anchor to the pointer, flipping the
    /// origin when the pointer is above/left of the anchor.
    pub fn update_selection(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<SelectionRect> {
        self.require("update a selection", &[InteractionState::Selecting])?;
        let anchor = self
            .anchor
            .context("selection has no anchor")?;
        let rect = SelectionRect::from_points(anchor.x, anchor.y, page_x, page_y);
        self.rect = Some(rect);
        Ok(rect)
    }

    /// Finish the drag. Returns `None` (and goes back to `idle`) when the
    /// drag was too small to be a real selection.
    pub fn end_selection(&mut self) -> PageSnapResult<Option<SelectionRect>> {
        self.require("end a selection", &[InteractionState::Selecting])?;
        self.anchor = None;
        match self.rect.map(|r| r.normalize()) {
            Some(rect) if !rect.is_degenerate(MIN_SELECTION_SIZE) => {
                self.rect = Some(rect);
                self.state = InteractionState::Selected;
                Ok(Some(rect))
            }
            _ => {
                log::debug!("[SELECTION] drag below {}px, treating as click", MIN_SELECTION_SIZE);
                self.reset();
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Resize / move
    // ------------------------------------------------------------------

    /// Start dragging a resize handle. Valid only from `selected`.
    pub fn begin_resize(&mut self, key: HandleKey, page_x: f64, page_y: f64) -> PageSnapResult<()> {
        self.begin_adjustment("begin a resize", Grip::Handle(key), page_x, page_y)
    }

    /// Start dragging the whole rectangle. Valid only from `selected`.
    pub fn begin_move(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<()> {
        self.begin_adjustment("begin a move", Grip::Body, page_x, page_y)
    }

    fn begin_adjustment(
        &mut self,
        action: &'static str,
        grip: Grip,
        page_x: f64,
        page_y: f64,
    ) -> PageSnapResult<()> {
        self.require(action, &[InteractionState::Selected])?;
        let original = self
            .rect
            .context("selected state without a rectangle")?;
        self.adjustment = Some(Adjustment {
            grip,
            effective: grip,
            start: PagePoint::new(page_x, page_y),
            original,
        });
        self.state = InteractionState::Resizing;
        Ok(())
    }

    /// Apply the pointer delta since `begin_resize` to the edges the handle
    /// controls. The opposite edge stays fixed; dragging past it inverts the
    /// rectangle and relabels the active handle.
    pub fn update_resize(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<SelectionRect> {
        self.require("update a resize", &[InteractionState::Resizing])?;
        let adjustment = self
            .adjustment
            .as_mut()
            .context("resizing without an active grip")?;

        let dx = page_x - adjustment.start.x;
        let dy = page_y - adjustment.start.y;
        let original = adjustment.original;

        let rect = match adjustment.grip {
            Grip::Body => original.offset(dx, dy),
            Grip::Handle(key) => {
                let (mut left, mut right) = (original.x, original.right());
                let (mut top, mut bottom) = (original.y, original.bottom());

                if key.moves_left() {
                    left += dx;
                } else if key.moves_right() {
                    right += dx;
                }
                if key.moves_top() {
                    top += dy;
                } else if key.moves_bottom() {
                    bottom += dy;
                }

                adjustment.effective = Grip::Handle(key.flipped(left > right, top > bottom));
                SelectionRect::from_points(left, top, right, bottom)
            }
        };

        self.rect = Some(rect);
        Ok(rect)
    }

    /// Finish the handle drag and return to `selected`. A rectangle squashed
    /// flat against its opposite edge is expanded back to the minimum size.
    pub fn end_resize(&mut self) -> PageSnapResult<SelectionRect> {
        self.require("end a resize", &[InteractionState::Resizing])?;
        let rect = self
            .rect
            .map(|r| r.normalize().ensure_min_size(MIN_SELECTION_SIZE))
            .context("resizing without a rectangle")?;
        self.rect = Some(rect);
        self.adjustment = None;
        self.state = InteractionState::Selected;
        Ok(rect)
    }

    // ------------------------------------------------------------------
    // Cancel / restart
    // ------------------------------------------------------------------

    /// Throw the rectangle away. Valid from `selecting`, `selected` and
    /// `resizing`.
    pub fn cancel(&mut self) -> PageSnapResult<()> {
        self.require(
            "cancel",
            &[
                InteractionState::Selecting,
                InteractionState::Selected,
                InteractionState::Resizing,
            ],
        )?;
        self.reset();
        Ok(())
    }

    /// Start over at the pointer: cancel whatever exists, then begin a new
    /// selection. Also recovers a stale `selecting`/`resizing` state whose
    /// pointer-up never arrived.
    pub fn restart(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<()> {
        if self.state == InteractionState::Capturing {
            return Err(PageSnapError::invalid_transition("restart", self.state));
        }
        if self.state.is_cancellable() {
            self.cancel()?;
        }
        self.begin_selection(page_x, page_y)
    }

    // ------------------------------------------------------------------
    // Capture hand-off
    // ------------------------------------------------------------------

    /// Freeze the rectangle for capture. Valid only from `selected`, so a
    /// second commit while the first is in flight is rejected.
    pub fn commit(&mut self) -> PageSnapResult<SelectionRect> {
        self.require("commit", &[InteractionState::Selected])?;
        let rect = self
            .rect
            .context("selected state without a rectangle")?;
        self.state = InteractionState::Capturing;
        Ok(rect)
    }

    /// The capture routine succeeded: the rectangle is consumed.
    pub fn complete_capture(&mut self) -> PageSnapResult<()> {
        self.require("complete a capture", &[InteractionState::Capturing])?;
        self.reset();
        Ok(())
    }

    /// The capture routine failed: keep the rectangle so the user can retry.
    pub fn fail_capture(&mut self) -> PageSnapResult<SelectionRect> {
        self.require("fail a capture", &[InteractionState::Capturing])?;
        let rect = self
            .rect
            .context("capturing without a rectangle")?;
        self.state = InteractionState::Selected;
        Ok(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(ax: f64, ay: f64, bx: f64, by: f64) -> SelectionStateMachine {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(ax, ay).unwrap();
        m.update_selection(bx, by).unwrap();
        m.end_selection().unwrap();
        m
    }

    #[test]
    fn test_drag_creates_rect() {
        let m = selected(200.0, 200.0, 400.0, 400.0);
        assert_eq!(m.state(), InteractionState::Selected);
        assert_eq!(m.rect(), Some(SelectionRect::new(200.0, 200.0, 200.0, 200.0)));
    }

    #[test]
    fn test_reverse_drag_normalizes() {
        let forward = selected(200.0, 200.0, 400.0, 400.0);
        let reverse = selected(400.0, 400.0, 200.0, 200.0);
        assert_eq!(forward.rect(), reverse.rect());

        let mixed = selected(400.0, 100.0, 100.0, 300.0);
        assert_eq!(mixed.rect(), Some(SelectionRect::new(100.0, 100.0, 300.0, 200.0)));
    }

    #[test]
    fn test_update_tracks_every_move() {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(100.0, 100.0).unwrap();
        assert_eq!(m.rect(), Some(SelectionRect::new(100.0, 100.0, 0.0, 0.0)));
        m.update_selection(50.0, 150.0).unwrap();
        assert_eq!(m.rect(), Some(SelectionRect::new(50.0, 100.0, 50.0, 50.0)));
        m.update_selection(180.0, 20.0).unwrap();
        assert_eq!(m.rect(), Some(SelectionRect::new(100.0, 20.0, 80.0, 80.0)));
    }

    #[test]
    fn test_click_without_drag_returns_to_idle() {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(100.0, 100.0).unwrap();
        m.update_selection(102.0, 300.0).unwrap();
        assert_eq!(m.end_selection().unwrap(), None);
        assert_eq!(m.state(), InteractionState::Idle);
        assert_eq!(m.rect(), None);
    }

    #[test]
    fn test_invalid_transitions_do_not_mutate() {
        let mut m = SelectionStateMachine::new();
        assert!(m.begin_resize(HandleKey::E, 0.0, 0.0).is_err());
        assert!(m.update_selection(1.0, 1.0).is_err());
        assert!(m.end_resize().is_err());
        assert!(m.commit().is_err());
        assert!(m.cancel().is_err());
        assert_eq!(m.state(), InteractionState::Idle);
        assert_eq!(m.rect(), None);

        let mut m = selected(0.0, 0.0, 100.0, 100.0);
        let before = m.rect();
        assert!(m.begin_selection(5.0, 5.0).is_err());
        assert!(m.update_resize(500.0, 500.0).is_err());
        assert_eq!(m.state(), InteractionState::Selected);
        assert_eq!(m.rect(), before);
    }

    #[test]
    fn test_resize_east_keeps_left_edge() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::E, 400.0, 300.0).unwrap();
        m.update_resize(450.0, 300.0).unwrap();
        let r = m.end_resize().unwrap();
        assert_eq!(r, SelectionRect::new(200.0, 200.0, 250.0, 200.0));
        assert_eq!(m.state(), InteractionState::Selected);
    }

    #[test]
    fn test_resize_west_keeps_right_edge() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::W, 200.0, 300.0).unwrap();
        let r = m.update_resize(250.0, 300.0).unwrap();
        assert_eq!(r, SelectionRect::new(250.0, 200.0, 150.0, 200.0));
        assert_eq!(r.right(), 400.0);
    }

    #[test]
    fn test_corner_resize_moves_two_edges() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::Nw, 200.0, 200.0).unwrap();
        let r = m.update_resize(150.0, 180.0).unwrap();
        assert_eq!(r, SelectionRect::new(150.0, 180.0, 250.0, 220.0));
        assert_eq!((r.right(), r.bottom()), (400.0, 400.0));
    }

    #[test]
    fn test_edge_handle_ignores_cross_axis() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::S, 300.0, 400.0).unwrap();
        let r = m.update_resize(900.0, 430.0).unwrap();
        assert_eq!(r, SelectionRect::new(200.0, 200.0, 200.0, 230.0));
    }

    #[test]
    fn test_resize_past_opposite_edge_flips_and_relabels() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::E, 400.0, 300.0).unwrap();
        let r = m.update_resize(150.0, 300.0).unwrap();
        assert_eq!(r, SelectionRect::new(150.0, 200.0, 50.0, 200.0));
        assert_eq!(m.active_grip(), Some(Grip::Handle(HandleKey::W)));

        // Dragging back restores the original labelling
        m.update_resize(420.0, 300.0).unwrap();
        assert_eq!(m.active_grip(), Some(Grip::Handle(HandleKey::E)));
        assert_eq!(m.rect(), Some(SelectionRect::new(200.0, 200.0, 220.0, 200.0)));
    }

    #[test]
    fn test_corner_flip_both_axes() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::Se, 400.0, 400.0).unwrap();
        m.update_resize(100.0, 150.0).unwrap();
        assert_eq!(m.active_grip(), Some(Grip::Handle(HandleKey::Nw)));
        assert_eq!(m.rect(), Some(SelectionRect::new(100.0, 150.0, 100.0, 50.0)));
    }

    #[test]
    fn test_end_resize_expands_flattened_rect() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_resize(HandleKey::E, 400.0, 300.0).unwrap();
        m.update_resize(200.0, 300.0).unwrap();
        let r = m.end_resize().unwrap();
        assert_eq!(r.width, MIN_SELECTION_SIZE);
        assert_eq!(r.x, 200.0);
    }

    #[test]
    fn test_move_keeps_size() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.begin_move(300.0, 300.0).unwrap();
        m.update_resize(320.0, 250.0).unwrap();
        let r = m.end_resize().unwrap();
        assert_eq!(r, SelectionRect::new(220.0, 150.0, 200.0, 200.0));
    }

    #[test]
    fn test_cancel_clears_rect() {
        let mut m = selected(0.0, 0.0, 50.0, 50.0);
        m.cancel().unwrap();
        assert_eq!(m.state(), InteractionState::Idle);
        assert_eq!(m.rect(), None);
    }

    #[test]
    fn test_restart_recovers_stale_states() {
        // Missing pointer-up while selecting
        let mut m = SelectionStateMachine::new();
        m.begin_selection(0.0, 0.0).unwrap();
        m.update_selection(100.0, 100.0).unwrap();
        m.restart(500.0, 500.0).unwrap();
        assert_eq!(m.state(), InteractionState::Selecting);
        assert_eq!(m.rect(), Some(SelectionRect::new(500.0, 500.0, 0.0, 0.0)));

        // Missing pointer-up while resizing
        let mut m = selected(0.0, 0.0, 100.0, 100.0);
        m.begin_resize(HandleKey::Se, 100.0, 100.0).unwrap();
        m.restart(10.0, 10.0).unwrap();
        assert_eq!(m.state(), InteractionState::Selecting);
        assert_eq!(m.active_grip(), None);
    }

    #[test]
    fn test_commit_only_once() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        let rect = m.commit().unwrap();
        assert_eq!(rect, SelectionRect::new(200.0, 200.0, 200.0, 200.0));
        assert_eq!(m.state(), InteractionState::Capturing);

        assert!(m.commit().is_err());
        assert!(m.begin_selection(0.0, 0.0).is_err());
        assert!(m.begin_resize(HandleKey::N, 300.0, 200.0).is_err());
        assert!(m.restart(0.0, 0.0).is_err());
        assert!(m.cancel().is_err());
        assert_eq!(m.state(), InteractionState::Capturing);
    }

    #[test]
    fn test_capture_success_returns_to_idle() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.commit().unwrap();
        m.complete_capture().unwrap();
        assert_eq!(m.state(), InteractionState::Idle);
        assert_eq!(m.rect(), None);
    }

    #[test]
    fn test_capture_failure_keeps_rect() {
        let mut m = selected(200.0, 200.0, 400.0, 400.0);
        m.commit().unwrap();
        let rect = m.fail_capture().unwrap();
        assert_eq!(rect, SelectionRect::new(200.0, 200.0, 200.0, 200.0));
        assert_eq!(m.state(), InteractionState::Selected);
        // Retry is possible
        assert!(m.commit().is_ok());
    }
}
