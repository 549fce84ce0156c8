//! Sidebar geometry.
//!
//! The panel is anchored to the left or right viewport edge. Only its
//! vertical position and height are free; the horizontal position is derived
//! from the side and the current viewport width every time it is clamped, so
//! a window resize never leaves the panel hanging off the right edge.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Width of the expanded panel
pub const EXPANDED_WIDTH: f64 = 320.0;

/// Width of the collapsed rail
pub const COLLAPSED_WIDTH: f64 = 48.0;

pub const MIN_HEIGHT: f64 = 200.0;

/// Preferred height when there is room for it
pub const DEFAULT_HEIGHT: f64 = 560.0;

/// Gap kept between the panel and the viewport edges
pub const MARGIN: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Header drag in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderDrag {
    pub pointer_y: f64,
    pub origin_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SidebarState {
    pub side: Side,
    pub collapsed: bool,
    /// Top-left corner in viewport coordinates
    pub position: Position,
    pub size: Size,
    pub visible: bool,
}

impl SidebarState {
    /// Hidden panel on `side`, laid out for a `vw` x `vh` viewport.
    pub fn new(side: Side, vw: f64, vh: f64) -> Self {
        let mut state = Self {
            side,
            collapsed: false,
            position: Position { x: 0.0, y: MARGIN },
            size: Size {
                width: EXPANDED_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            visible: false,
        };
        state.clamp(vw, vh);
        state
    }

    pub fn width_for(collapsed: bool) -> f64 {
        if collapsed {
            COLLAPSED_WIDTH
        } else {
            EXPANDED_WIDTH
        }
    }

    /// Keep the panel fully on screen for a `vw` x `vh` viewport.
    pub fn clamp(&mut self, vw: f64, vh: f64) {
        let max_height = (vh - 2.0 * MARGIN).max(0.0);
        self.size.width = Self::width_for(self.collapsed).min((vw - 2.0 * MARGIN).max(0.0));
        self.size.height = self.size.height.max(MIN_HEIGHT).min(max_height);

        self.position.x = match self.side {
            Side::Left => MARGIN,
            Side::Right => (vw - self.size.width - MARGIN).max(MARGIN.min(vw)),
        };

        let max_y = (vh - self.size.height - MARGIN).max(MARGIN.min(vh));
        self.position.y = self.position.y.clamp(MARGIN.min(max_y), max_y);
    }

    pub fn set_side(&mut self, side: Side, vw: f64, vh: f64) {
        self.side = side;
        self.clamp(vw, vh);
    }

    pub fn toggle_collapsed(&mut self, vw: f64, vh: f64) {
        self.collapsed = !self.collapsed;
        self.clamp(vw, vh);
    }

    pub fn begin_drag(&self, pointer_y: f64) -> HeaderDrag {
        HeaderDrag {
            pointer_y,
            origin_y: self.position.y,
        }
    }

    /// Follow a header drag: vertical movement, and the side flips to
    /// whichever half of the viewport the pointer is in.
    pub fn drag_to(&mut self, drag: &HeaderDrag, pointer_x: f64, pointer_y: f64, vw: f64, vh: f64) {
        self.position.y = drag.origin_y + (pointer_y - drag.pointer_y);
        self.side = if pointer_x < vw / 2.0 {
            Side::Left
        } else {
            Side::Right
        };
        self.clamp(vw, vh);
    }

    pub fn resize_height(&mut self, height: f64, vw: f64, vh: f64) {
        self.size.height = height;
        self.clamp(vw, vh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_right_side() {
        let s = SidebarState::new(Side::Right, 1280.0, 800.0);
        assert_eq!(s.position.x, 1280.0 - EXPANDED_WIDTH - MARGIN);
        assert_eq!(s.position.y, MARGIN);
        assert_eq!(s.size.height, DEFAULT_HEIGHT);
        assert!(!s.visible);
    }

    #[test]
    fn test_left_side_anchor() {
        let s = SidebarState::new(Side::Left, 1280.0, 800.0);
        assert_eq!(s.position.x, MARGIN);
    }

    #[test]
    fn test_window_resize_recomputes_right_anchor() {
        let mut s = SidebarState::new(Side::Right, 1920.0, 1080.0);
        s.clamp(1000.0, 1080.0);
        assert_eq!(s.position.x, 1000.0 - EXPANDED_WIDTH - MARGIN);
        assert!(s.position.x + s.size.width <= 1000.0);
    }

    #[test]
    fn test_shrinking_height_pulls_panel_up() {
        let mut s = SidebarState::new(Side::Right, 1280.0, 1000.0);
        s.position.y = 400.0;
        s.clamp(1280.0, 700.0);
        assert_eq!(s.size.height, DEFAULT_HEIGHT);
        assert_eq!(s.position.y, 700.0 - DEFAULT_HEIGHT - MARGIN);

        s.clamp(1280.0, 400.0);
        assert_eq!(s.size.height, 400.0 - 2.0 * MARGIN);
        assert_eq!(s.position.y, MARGIN);
    }

    #[test]
    fn test_collapse_uses_rail_width() {
        let mut s = SidebarState::new(Side::Right, 1280.0, 800.0);
        s.toggle_collapsed(1280.0, 800.0);
        assert!(s.collapsed);
        assert_eq!(s.size.width, COLLAPSED_WIDTH);
        assert_eq!(s.position.x, 1280.0 - COLLAPSED_WIDTH - MARGIN);
        s.toggle_collapsed(1280.0, 800.0);
        assert_eq!(s.size.width, EXPANDED_WIDTH);
    }

    #[test]
    fn test_drag_moves_vertically_and_snaps_side() {
        let mut s = SidebarState::new(Side::Right, 1280.0, 1000.0);
        let drag = s.begin_drag(20.0);
        s.drag_to(&drag, 1100.0, 120.0, 1280.0, 1000.0);
        assert_eq!(s.position.y, MARGIN + 100.0);
        assert_eq!(s.side, Side::Right);

        s.drag_to(&drag, 300.0, 120.0, 1280.0, 1000.0);
        assert_eq!(s.side, Side::Left);
        assert_eq!(s.position.x, MARGIN);

        // Dragged far past the bottom edge
        s.drag_to(&drag, 300.0, 5000.0, 1280.0, 1000.0);
        assert_eq!(s.position.y, 1000.0 - s.size.height - MARGIN);
    }

    #[test]
    fn test_resize_height_bounds() {
        let mut s = SidebarState::new(Side::Left, 1280.0, 800.0);
        s.resize_height(50.0, 1280.0, 800.0);
        assert_eq!(s.size.height, MIN_HEIGHT);
        s.resize_height(5000.0, 1280.0, 800.0);
        assert_eq!(s.size.height, 800.0 - 2.0 * MARGIN);
    }

    #[test]
    fn test_tiny_viewport_never_goes_negative() {
        let mut s = SidebarState::new(Side::Right, 100.0, 100.0);
        s.clamp(100.0, 100.0);
        assert!(s.position.x >= 0.0);
        assert!(s.position.y >= 0.0);
        assert!(s.size.width <= 100.0);
        assert!(s.size.height <= 100.0);
    }
}
