//! Dimming mask around the selection.
//!
//! Four fixed-position segments cover everything except the selection:
//!
//! ```text
//! +---------------------------+
//! |           top             |
//! +------+-----------+--------+
//! | left | selection | right  |
//! +------+-----------+--------+
//! |          bottom           |
//! +---------------------------+
//! ```
//!
//! Segments are computed in viewport space from the selection's current
//! on-screen position, clamped to the viewport so none has a negative size
//! when the selection is partly scrolled out of view.

use super::coords::{Viewport, ViewportRect};
use super::types::SelectionRect;

pub type MaskSegment = ViewportRect;

/// Top, bottom, left and right segments for `rect` under `viewport`.
pub fn get_mask_segments(rect: &SelectionRect, viewport: &Viewport) -> [MaskSegment; 4] {
    let vw = viewport.width.max(0.0);
    let vh = viewport.height.max(0.0);
    let on_screen = viewport.rect_to_viewport(&rect.normalize());

    let left = on_screen.left.clamp(0.0, vw);
    let right = on_screen.right().clamp(left, vw);
    let top = on_screen.top.clamp(0.0, vh);
    let bottom = on_screen.bottom().clamp(top, vh);

    [
        MaskSegment::new(0.0, 0.0, vw, top),
        MaskSegment::new(0.0, bottom, vw, vh - bottom),
        MaskSegment::new(0.0, top, left, bottom - top),
        MaskSegment::new(right, top, vw - right, bottom - top),
    ]
}

/// Single segment dimming the whole viewport (no selection yet).
pub fn full_mask(viewport: &Viewport) -> MaskSegment {
    MaskSegment::new(0.0, 0.0, viewport.width.max(0.0), viewport.height.max(0.0))
}
