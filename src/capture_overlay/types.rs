//! Type definitions for the capture overlay.
//!
//! This module contains the selection rectangle, the interaction modes,
//! resize handle identifiers and the constants shared by the geometry,
//! state and rendering code.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Constants
// ============================================================================

/// DOM id of the overlay root appended to `document.body`
pub const OVERLAY_ROOT_ID: &str = "pagesnap-capture-overlay";

/// Size of resize handles in CSS pixels
pub const HANDLE_SIZE: f64 = 10.0;

/// Half the handle size (used for hit-testing)
pub const HANDLE_HALF: f64 = HANDLE_SIZE / 2.0;

/// Selections narrower or shorter than this are treated as a click
pub const MIN_SELECTION_SIZE: f64 = 5.0;

/// Gap between the selection and its size indicator
pub const SIZE_LABEL_GAP: f64 = 8.0;

/// Height reserved for the size indicator above the selection
pub const SIZE_LABEL_HEIGHT: f64 = 22.0;

// ============================================================================
// Geometry Types
// ============================================================================

/// A selection rectangle in page coordinates.
///
/// Finalized rectangles always have non-negative width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two arbitrary corner points, normalized so the
    /// origin is the top-left corner.
    pub fn from_points(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self::from_edges(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }

    /// Rectangle from left/top/right/bottom edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Normalize so width and height are non-negative
    pub fn normalize(&self) -> Self {
        Self::from_points(self.x, self.y, self.right(), self.bottom())
    }

    /// Check if a point is strictly inside the rectangle (not on edges)
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.bottom()
    }

    /// True when either side is below `min` (a click rather than a drag)
    pub fn is_degenerate(&self, min: f64) -> bool {
        self.width < min || self.height < min
    }

    /// Ensure minimum size, expanding right/bottom if needed
    pub fn ensure_min_size(&self, min: f64) -> Self {
        let mut r = *self;
        if r.width < min {
            r.width = min;
        }
        if r.height < min {
            r.height = min;
        }
        r
    }

    /// Offset the rectangle by dx, dy
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: &SelectionRect) -> Option<SelectionRect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Self::from_edges(left, top, right, bottom))
        } else {
            None
        }
    }

    /// Width and height rounded to whole pixels, for the size indicator.
    pub fn rounded_size(&self) -> (u32, u32) {
        (
            self.width.max(0.0).round() as u32,
            self.height.max(0.0).round() as u32,
        )
    }
}

// ============================================================================
// Interaction State
// ============================================================================

/// Interaction mode of the area selection. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointer down, dragging out a new rectangle
    Selecting,
    /// Rectangle finalized, handles visible
    Selected,
    /// A handle (or the rectangle body) is being dragged
    Resizing,
    /// Rectangle frozen, overlay hidden, capture in flight
    Capturing,
}

impl InteractionState {
    /// States in which a rectangle exists and can be thrown away by the user.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Selecting | Self::Selected | Self::Resizing)
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Selecting => write!(f, "selecting"),
            Self::Selected => write!(f, "selected"),
            Self::Resizing => write!(f, "resizing"),
            Self::Capturing => write!(f, "capturing"),
        }
    }
}

// ============================================================================
// Handle Types
// ============================================================================

/// Resize handle on the selection rectangle.
///
/// Declaration order is the render order: NW, N, NE, W, E, SW, S, SE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum HandleKey {
    Nw,
    N,
    Ne,
    W,
    E,
    Sw,
    S,
    Se,
}

impl HandleKey {
    pub const ALL: [HandleKey; 8] = [
        HandleKey::Nw,
        HandleKey::N,
        HandleKey::Ne,
        HandleKey::W,
        HandleKey::E,
        HandleKey::Sw,
        HandleKey::S,
        HandleKey::Se,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nw => "nw",
            Self::N => "n",
            Self::Ne => "ne",
            Self::W => "w",
            Self::E => "e",
            Self::Sw => "sw",
            Self::S => "s",
            Self::Se => "se",
        }
    }

    /// Parse a handle key as stored in a `data-handle` attribute.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Cursor shown while hovering or dragging this handle
    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Nw | Self::Se => Cursor::NwseResize,
            Self::Ne | Self::Sw => Cursor::NeswResize,
            Self::N | Self::S => Cursor::NsResize,
            Self::W | Self::E => Cursor::EwResize,
        }
    }

    /// Axis the handle resizes along
    pub fn orientation(&self) -> Orientation {
        match self {
            Self::Nw | Self::Ne | Self::Sw | Self::Se => Orientation::Corner,
            Self::W | Self::E => Orientation::Horizontal,
            Self::N | Self::S => Orientation::Vertical,
        }
    }

    pub fn corner(&self) -> Option<Corner> {
        match self {
            Self::Nw => Some(Corner::Tl),
            Self::Ne => Some(Corner::Tr),
            Self::Sw => Some(Corner::Bl),
            Self::Se => Some(Corner::Br),
            _ => None,
        }
    }

    pub fn moves_left(&self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    pub fn moves_top(&self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    /// The handle that ends up under the pointer after the rectangle
    /// inverted along one or both axes.
    pub fn flipped(&self, horizontal: bool, vertical: bool) -> Self {
        let key = if horizontal {
            match self {
                Self::Nw => Self::Ne,
                Self::Ne => Self::Nw,
                Self::W => Self::E,
                Self::E => Self::W,
                Self::Sw => Self::Se,
                Self::Se => Self::Sw,
                other => *other,
            }
        } else {
            *self
        };
        if vertical {
            match key {
                Self::Nw => Self::Sw,
                Self::Sw => Self::Nw,
                Self::N => Self::S,
                Self::S => Self::N,
                Self::Ne => Self::Se,
                Self::Se => Self::Ne,
                other => other,
            }
        } else {
            key
        }
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize axis of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Orientation {
    /// Resizes both axes
    Corner,
    /// Resizes width only (W/E)
    Horizontal,
    /// Resizes height only (N/S)
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Corner {
    Tl,
    Tr,
    Bl,
    Br,
}

/// CSS cursor hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Cursor {
    #[default]
    #[serde(rename = "crosshair")]
    Crosshair,
    #[serde(rename = "move")]
    Move,
    #[serde(rename = "nwse-resize")]
    NwseResize,
    #[serde(rename = "nesw-resize")]
    NeswResize,
    #[serde(rename = "ns-resize")]
    NsResize,
    #[serde(rename = "ew-resize")]
    EwResize,
    #[serde(rename = "progress")]
    Progress,
}

impl Cursor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Crosshair => "crosshair",
            Self::Move => "move",
            Self::NwseResize => "nwse-resize",
            Self::NeswResize => "nesw-resize",
            Self::NsResize => "ns-resize",
            Self::EwResize => "ew-resize",
            Self::Progress => "progress",
        }
    }
}

/// What a pointer-down landed on, relative to a finalized selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grip {
    /// One of the eight resize handles
    Handle(HandleKey),
    /// Interior of the selection (moves the whole rectangle)
    Body,
}

impl Grip {
    pub fn cursor(&self) -> Cursor {
        match self {
            Self::Handle(key) => key.cursor(),
            Self::Body => Cursor::Move,
        }
    }
}

// ============================================================================
// Command Types (binding -> overlay)
// ============================================================================

/// Follow-up the browser binding has to perform after feeding an input
/// event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayCommand {
    #[default]
    None,
    /// Repaint the overlay from a fresh frame
    Repaint,
    /// Start the asynchronous capture of the current selection
    Capture,
    /// The overlay was dismissed and unmounted
    Closed,
}
