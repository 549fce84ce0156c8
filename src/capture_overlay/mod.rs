//! In-page area selection and capture overlay.
//!
//! Lets the user drag out a rectangle over the live page, adjust it with
//! resize handles (or move it by its body), cancel it, and hand the final
//! rectangle to a capture routine.
//!
//! # Features
//!
//! - Drag-to-select with normalization for reverse drags
//! - Eight resize handles with flip-and-relabel past the opposite edge
//! - Dimmed mask around a clear selection area
//! - Size indicator while selecting/resizing
//! - Warning when the selection reaches outside the viewport
//! - Portal container outside the host page's layout
//!
//! # Architecture
//!
//! ```text
//! mod.rs (public API)
//!   |
//!   +-- types.rs (geometry, modes, handle keys, constants)
//!   +-- coords.rs (page <-> viewport translation)
//!   +-- handles.rs (handle geometry, hit-testing)
//!   +-- state.rs (selection state machine)
//!   +-- mask.rs (dim segments)
//!   +-- portal.rs (body-level container lifecycle)
//!   +-- render.rs (frame description for the painter)
//!   +-- controller.rs (input routing, capture hand-off, events)
//! ```
//!
//! The selection is always stored in page coordinates and translated with
//! the current scroll offset at paint time, so it stays glued to the
//! document while the page scrolls.

mod controller;
mod coords;
mod handles;
mod mask;
mod portal;
mod render;
mod state;
pub mod types;


pub use controller::{CaptureOverlayController, CaptureTicket, OverlayEvent, OverlayKey};
pub use coords::{PagePoint, PageSpace, Viewport, ViewportPoint, ViewportRect, ViewportSpace};
pub use handles::{get_handle_positions, hit_test, HandlePosition};
pub use mask::{full_mask, get_mask_segments, MaskSegment};
pub use portal::{Portal, PortalHost};
pub use render::{build_frame, OverlayFrame, PlacedHandle, SizeLabel};
pub use state::SelectionStateMachine;
pub use types::{
    Cursor, Grip, HandleKey, InteractionState, OverlayCommand, SelectionRect, HANDLE_SIZE,
    MIN_SELECTION_SIZE, OVERLAY_ROOT_ID,
};
