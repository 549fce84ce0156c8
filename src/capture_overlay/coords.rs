//! Type-safe coordinate spaces for the overlay.
//!
//! The selection lives in page space so it stays glued to the document while
//! the user scrolls. Everything the overlay paints is `position: fixed`, so it
//! lives in viewport space:
//!
//! ```text
//! PageSpace  --(minus scroll offset)-->  ViewportSpace
//! ```
//!
//! Translation always reads the scroll offset of the `Viewport` passed in;
//! nothing here caches a previous offset.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::types::SelectionRect;

/// Document coordinates, independent of the current scroll position.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct PageSpace;

/// Coordinates relative to the visible viewport (`position: fixed` frame).
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct ViewportSpace;

/// A 2D coordinate tagged with its coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord<TSpace> {
    pub x: f64,
    pub y: f64,
    _space: std::marker::PhantomData<TSpace>,
}

impl<TSpace: Default> Coord<TSpace> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _space: std::marker::PhantomData,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

pub type PagePoint = Coord<PageSpace>;
pub type ViewportPoint = Coord<ViewportSpace>;

/// A rectangle in viewport coordinates, as consumed by fixed-position
/// overlay elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Scroll offset and size of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Viewport {
    /// Horizontal scroll offset (`window.scrollX`)
    pub scroll_x: f64,
    /// Vertical scroll offset (`window.scrollY`)
    pub scroll_y: f64,
    /// Viewport width in CSS pixels
    pub width: f64,
    /// Viewport height in CSS pixels
    pub height: f64,
    /// `window.devicePixelRatio`
    pub device_pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Same viewport scrolled to the given offset.
    pub fn scrolled_to(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    /// Convert page coordinates to viewport coordinates using the current
    /// scroll offset.
    pub fn to_viewport_coords(&self, page_x: f64, page_y: f64) -> ViewportPoint {
        ViewportPoint::new(page_x - self.scroll_x, page_y - self.scroll_y)
    }

    /// Convert viewport (client) coordinates to page coordinates.
    pub fn to_page_coords(&self, client_x: f64, client_y: f64) -> PagePoint {
        PagePoint::new(client_x + self.scroll_x, client_y + self.scroll_y)
    }

    /// Translate a page-space selection into viewport space.
    pub fn rect_to_viewport(&self, rect: &SelectionRect) -> ViewportRect {
        let origin = self.to_viewport_coords(rect.x, rect.y);
        ViewportRect::new(origin.x, origin.y, rect.width, rect.height)
    }

    /// The part of the document currently visible, in page coordinates.
    pub fn visible_page_rect(&self) -> SelectionRect {
        SelectionRect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// True when the whole selection is on screen (nothing would be lost to
    /// the viewport-bounded capture).
    pub fn fully_contains(&self, rect: &SelectionRect) -> bool {
        rect.x >= self.scroll_x
            && rect.y >= self.scroll_y
            && rect.right() <= self.scroll_x + self.width
            && rect.bottom() <= self.scroll_y + self.height
    }
}
