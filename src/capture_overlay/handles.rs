//! Resize handle geometry and hit-testing.
//!
//! Handle positions are a pure function of the rectangle's width and height
//! and are recomputed on every frame. They are relative to the rectangle's
//! own top-left corner; the renderer offsets them by the viewport position.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::types::{
    Corner, Cursor, Grip, HandleKey, Orientation, SelectionRect, HANDLE_HALF,
};

/// One resize handle, positioned relative to the selection origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HandlePosition {
    pub x: f64,
    pub y: f64,
    pub cursor: Cursor,
    pub key: HandleKey,
    pub orientation: Orientation,
    pub corner: Option<Corner>,
}

/// The eight handles of a `width` x `height` rectangle, in the order
/// NW, N, NE, W, E, SW, S, SE.
pub fn get_handle_positions(width: f64, height: f64) -> [HandlePosition; 8] {
    HandleKey::ALL.map(|key| {
        let (x, y) = handle_offset(key, width, height);
        HandlePosition {
            x,
            y,
            cursor: key.cursor(),
            key,
            orientation: key.orientation(),
            corner: key.corner(),
        }
    })
}

/// Offset of a handle from the rectangle origin.
fn handle_offset(key: HandleKey, width: f64, height: f64) -> (f64, f64) {
    let x = if key.moves_left() {
        0.0
    } else if key.moves_right() {
        width
    } else {
        width / 2.0
    };
    let y = if key.moves_top() {
        0.0
    } else if key.moves_bottom() {
        height
    } else {
        height / 2.0
    };
    (x, y)
}

/// Determine which grip (if any) is at the given page point.
///
/// Checks in order of priority:
/// 1. Corners
/// 2. Edge midpoints
/// 3. Interior (for moving the entire selection)
/// 4. None (outside the selection)
pub fn hit_test(rect: &SelectionRect, x: f64, y: f64) -> Option<Grip> {
    let handles = get_handle_positions(rect.width, rect.height);

    let near = |h: &HandlePosition| {
        is_near(x, rect.x + h.x, HANDLE_HALF) && is_near(y, rect.y + h.y, HANDLE_HALF)
    };

    if let Some(h) = handles.iter().filter(|h| h.corner.is_some()).find(|h| near(h)) {
        return Some(Grip::Handle(h.key));
    }
    if let Some(h) = handles.iter().filter(|h| h.corner.is_none()).find(|h| near(h)) {
        return Some(Grip::Handle(h.key));
    }
    if rect.contains_strict(x, y) {
        return Some(Grip::Body);
    }
    None
}

/// Check if two values are within a threshold of each other
#[inline]
fn is_near(a: f64, b: f64, threshold: f64) -> bool {
    (a - b).abs() <= threshold
}
