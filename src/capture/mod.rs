//! Capture pipeline.
//!
//! The browser's screenshot call is an opaque capability (`TabCapture`) that
//! returns the visible part of the tab as an RGBA image. Everything else,
//! from cropping to the selection and stitching full-page tiles to encoding
//! the result, happens here on plain `image` buffers.
//!
//! ```text
//! TabCapture::capture_visible ─┬─> crop_to_selection ──> CapturedImage (area)
//!                              ├─> as-is             ──> CapturedImage (viewport)
//!                              └─> stitch_tiles      ──> CapturedImage (full page)
//!                                                            │
//!                                                     encode_image ──> data URL
//! ```

pub mod crop;
pub mod encode;
pub mod full_page;

use futures::future::LocalBoxFuture;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::capture_overlay::{SelectionRect, Viewport};
use crate::error::PageSnapResult;

pub use crop::{crop_to_selection, visible_region};
pub use encode::{decode_data_url, encode_image, EncodedImage};
pub use full_page::{capture_full_page, plan_full_page_tiles, stitch_tiles, DocumentSize, TilePosition};

/// What was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum CaptureMode {
    /// The visible viewport, uncropped
    Viewport,
    /// A user-selected rectangle
    Area,
    /// The whole document, stitched from scrolled captures
    FullPage,
}

/// Raw result of a capture, before encoding.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub image: RgbaImage,
    pub mode: CaptureMode,
    /// Page-space region the pixels correspond to
    pub source_rect: SelectionRect,
}

impl CapturedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// The browser's "capture visible tab" capability.
///
/// Single-threaded: futures are not `Send`.
pub trait TabCapture {
    /// Current scroll offset and size of the tab's viewport.
    fn viewport(&self) -> Viewport;

    /// Screenshot of the visible viewport, in device pixels.
    fn capture_visible(&self) -> LocalBoxFuture<'_, PageSnapResult<RgbaImage>>;

    /// Scroll the page and wait until the new position is painted.
    fn scroll_to(&self, x: f64, y: f64) -> LocalBoxFuture<'_, PageSnapResult<()>>;
}

/// Capture of a committed selection rectangle: the boundary between the
/// overlay and the outside world.
pub trait CaptureBackend {
    fn capture(&self, rect: SelectionRect) -> LocalBoxFuture<'_, PageSnapResult<CapturedImage>>;
}

/// Area capture on top of a visible-tab capability: screenshot the viewport
/// and crop to the part of the selection that is on screen.
pub struct VisibleAreaCapture<T> {
    tab: T,
}

impl<T: TabCapture> VisibleAreaCapture<T> {
    pub fn new(tab: T) -> Self {
        Self { tab }
    }

    pub fn tab(&self) -> &T {
        &self.tab
    }

    /// Uncropped capture of the visible viewport.
    pub async fn capture_viewport(&self) -> PageSnapResult<CapturedImage> {
        let viewport = self.tab.viewport();
        let image = self.tab.capture_visible().await?;
        log::info!(
            "[CAPTURE] Viewport captured: {}x{}",
            image.width(),
            image.height()
        );
        Ok(CapturedImage {
            image,
            mode: CaptureMode::Viewport,
            source_rect: viewport.visible_page_rect(),
        })
    }

    async fn capture_area(&self, rect: SelectionRect) -> PageSnapResult<CapturedImage> {
        let viewport = self.tab.viewport();
        // Fail before the round trip when nothing is on screen
        let visible = visible_region(&rect, &viewport)?;
        let full = self.tab.capture_visible().await?;
        let image = crop_to_selection(&full, &rect, &viewport)?;
        log::info!(
            "[CAPTURE] Area captured: {}x{} from {}x{}",
            image.width(),
            image.height(),
            full.width(),
            full.height()
        );
        Ok(CapturedImage {
            image,
            mode: CaptureMode::Area,
            source_rect: visible,
        })
    }
}

impl<T: TabCapture> CaptureBackend for VisibleAreaCapture<T> {
    fn capture(&self, rect: SelectionRect) -> LocalBoxFuture<'_, PageSnapResult<CapturedImage>> {
        Box::pin(self.capture_area(rect))
    }
}
