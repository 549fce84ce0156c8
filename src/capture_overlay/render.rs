//! Overlay frame description.
//!
//! `build_frame` turns the state machine and the current viewport into
//! everything the painter has to draw: the dim mask, the clear selection
//! area, handles, the size indicator, the cursor and the chrome (instructions,
//! cancel/capture buttons, clipped warning). The frame is rebuilt after every
//! state change or scroll; it holds no state of its own.

use serde::Serialize;

use super::coords::{Viewport, ViewportRect};
use super::handles::get_handle_positions;
use super::mask::{full_mask, get_mask_segments, MaskSegment};
use super::state::SelectionStateMachine;
use super::types::{
    Cursor, Grip, HandleKey, InteractionState, SIZE_LABEL_GAP, SIZE_LABEL_HEIGHT,
};

/// A handle placed in viewport coordinates (its center point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedHandle {
    pub key: HandleKey,
    pub x: f64,
    pub y: f64,
    pub cursor: Cursor,
}

/// Rounded "W × H" indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeLabel {
    pub text: String,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    /// False while capturing: the overlay must not end up in the screenshot
    pub visible: bool,
    pub state: InteractionState,
    /// Dim segments (one full segment when nothing is selected)
    pub mask: Vec<MaskSegment>,
    /// Clear selection area, in viewport coordinates
    pub selection: Option<ViewportRect>,
    pub handles: Vec<PlacedHandle>,
    pub size_label: Option<SizeLabel>,
    pub cursor: Cursor,
    pub show_instructions: bool,
    pub show_capture_button: bool,
    /// Part of the selection is outside the viewport and will be cut off
    pub clipped_warning: bool,
}

/// Build the frame for the current state.
///
/// `hover` is the grip under the pointer while `selected`, used for the
/// cursor hint.
pub fn build_frame(
    machine: &SelectionStateMachine,
    viewport: &Viewport,
    hover: Option<Grip>,
) -> OverlayFrame {
    let state = machine.state();
    let rect = machine.rect().map(|r| r.normalize());

    let mut frame = OverlayFrame {
        visible: state != InteractionState::Capturing,
        state,
        mask: vec![full_mask(viewport)],
        selection: None,
        handles: Vec::new(),
        size_label: None,
        cursor: Cursor::Crosshair,
        show_instructions: state == InteractionState::Idle,
        show_capture_button: state == InteractionState::Selected,
        clipped_warning: false,
    };

    let Some(rect) = rect else {
        return frame;
    };

    let on_screen = viewport.rect_to_viewport(&rect);
    frame.mask = get_mask_segments(&rect, viewport).to_vec();
    frame.selection = Some(on_screen);
    frame.clipped_warning = !viewport.fully_contains(&rect);

    if matches!(state, InteractionState::Selected | InteractionState::Resizing) {
        frame.handles = get_handle_positions(rect.width, rect.height)
            .iter()
            .map(|h| PlacedHandle {
                key: h.key,
                x: on_screen.left + h.x,
                y: on_screen.top + h.y,
                cursor: h.cursor,
            })
            .collect();
    }

    if matches!(state, InteractionState::Selecting | InteractionState::Resizing) {
        frame.size_label = Some(size_label(&on_screen));
    }

    frame.cursor = match state {
        InteractionState::Resizing => machine
            .active_grip()
            .map(|g| g.cursor())
            .unwrap_or(Cursor::Crosshair),
        InteractionState::Selected => hover.map(|g| g.cursor()).unwrap_or(Cursor::Crosshair),
        InteractionState::Capturing => Cursor::Progress,
        _ => Cursor::Crosshair,
    };

    frame
}

/// Indicator above the selection, or just inside the top edge below it
/// when there's no room above.
fn size_label(on_screen: &ViewportRect) -> SizeLabel {
    let (w, h) = (on_screen.width.max(0.0).round(), on_screen.height.max(0.0).round());
    let top = if on_screen.top < SIZE_LABEL_HEIGHT + SIZE_LABEL_GAP {
        on_screen.top + SIZE_LABEL_GAP
    } else {
        on_screen.top - SIZE_LABEL_HEIGHT - SIZE_LABEL_GAP
    };
    SizeLabel {
        text: format!("{} × {}", w, h),
        left: on_screen.left,
        top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected_machine(x: f64, y: f64, w: f64, h: f64) -> SelectionStateMachine {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(x, y).unwrap();
        m.update_selection(x + w, y + h).unwrap();
        m.end_selection().unwrap();
        m
    }

    #[test]
    fn test_idle_frame_dims_everything() {
        let m = SelectionStateMachine::new();
        let vp = Viewport::new(800.0, 600.0);
        let frame = build_frame(&m, &vp, None);
        assert!(frame.visible);
        assert!(frame.show_instructions);
        assert!(!frame.show_capture_button);
        assert_eq!(frame.mask, vec![ViewportRect::new(0.0, 0.0, 800.0, 600.0)]);
        assert!(frame.selection.is_none());
        assert!(frame.handles.is_empty());
    }

    #[test]
    fn test_selecting_shows_size_label_without_handles() {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(100.0, 100.0).unwrap();
        m.update_selection(300.4, 249.6).unwrap();
        let frame = build_frame(&m, &Viewport::new(800.0, 600.0), None);

        assert_eq!(frame.mask.len(), 4);
        assert!(frame.handles.is_empty());
        let label = frame.size_label.unwrap();
        assert_eq!(label.text, "200 × 150");
        assert_eq!(label.left, 100.0);
        assert_eq!(label.top, 100.0 - SIZE_LABEL_HEIGHT - SIZE_LABEL_GAP);
        assert!(!frame.show_instructions);
    }

    #[test]
    fn test_size_label_moves_inside_near_top() {
        let mut m = SelectionStateMachine::new();
        m.begin_selection(10.0, 5.0).unwrap();
        m.update_selection(110.0, 105.0).unwrap();
        let frame = build_frame(&m, &Viewport::new(800.0, 600.0), None);
        assert_eq!(frame.size_label.unwrap().top, 5.0 + SIZE_LABEL_GAP);
    }

    #[test]
    fn test_selected_frame_places_handles_in_viewport_space() {
        let m = selected_machine(200.0, 700.0, 100.0, 50.0);
        let vp = Viewport::new(800.0, 600.0).scrolled_to(0.0, 500.0);
        let frame = build_frame(&m, &vp, None);

        assert!(frame.show_capture_button);
        assert!(frame.size_label.is_none());
        assert_eq!(frame.selection, Some(ViewportRect::new(200.0, 200.0, 100.0, 50.0)));
        assert_eq!(frame.handles.len(), 8);
        assert_eq!((frame.handles[0].x, frame.handles[0].y), (200.0, 200.0));
        assert_eq!((frame.handles[7].x, frame.handles[7].y), (300.0, 250.0));
    }

    #[test]
    fn test_hover_cursor() {
        let m = selected_machine(100.0, 100.0, 100.0, 100.0);
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(build_frame(&m, &vp, Some(Grip::Body)).cursor, Cursor::Move);
        assert_eq!(
            build_frame(&m, &vp, Some(Grip::Handle(HandleKey::Ne))).cursor,
            Cursor::NeswResize
        );
        assert_eq!(build_frame(&m, &vp, None).cursor, Cursor::Crosshair);
    }

    #[test]
    fn test_resizing_cursor_follows_flipped_handle() {
        let mut m = selected_machine(100.0, 100.0, 100.0, 100.0);
        m.begin_resize(HandleKey::N, 150.0, 100.0).unwrap();
        m.update_resize(150.0, 300.0).unwrap();
        let frame = build_frame(&m, &Viewport::new(800.0, 600.0), None);
        assert_eq!(frame.cursor, Cursor::NsResize);
        assert!(frame.size_label.is_some());
        assert_eq!(frame.handles.len(), 8);
    }

    #[test]
    fn test_clipped_warning() {
        let m = selected_machine(100.0, 500.0, 100.0, 200.0);
        let frame = build_frame(&m, &Viewport::new(800.0, 600.0), None);
        assert!(frame.clipped_warning);

        let frame = build_frame(&m, &Viewport::new(800.0, 600.0).scrolled_to(0.0, 200.0), None);
        assert!(!frame.clipped_warning);
    }

    #[test]
    fn test_capturing_frame_is_hidden() {
        let mut m = selected_machine(0.0, 0.0, 50.0, 50.0);
        m.commit().unwrap();
        let frame = build_frame(&m, &Viewport::new(800.0, 600.0), None);
        assert!(!frame.visible);
        assert_eq!(frame.cursor, Cursor::Progress);
        assert_eq!(frame.selection, Some(ViewportRect::new(0.0, 0.0, 50.0, 50.0)));
    }
}
