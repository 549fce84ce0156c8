//! Cropping a visible-tab screenshot to the selection.
//!
//! The screenshot covers exactly the viewport, in device pixels. The
//! selection is in page space and may reach outside the viewport; only the
//! on-screen part can be captured.

use image::{imageops, RgbaImage};

use crate::capture_overlay::{SelectionRect, Viewport};
use crate::error::{PageSnapError, PageSnapResult};

/// The part of `rect` that is on screen, in page coordinates.
pub fn visible_region(rect: &SelectionRect, viewport: &Viewport) -> PageSnapResult<SelectionRect> {
    rect.normalize()
        .intersect(&viewport.visible_page_rect())
        .ok_or(PageSnapError::InvalidRegion)
}

/// Crop `screenshot` (a capture of `viewport`) to the visible part of `rect`.
///
/// The scale between CSS and image pixels is derived from the screenshot
/// itself, falling back to the device pixel ratio when the viewport width is
/// unknown.
pub fn crop_to_selection(
    screenshot: &RgbaImage,
    rect: &SelectionRect,
    viewport: &Viewport,
) -> PageSnapResult<RgbaImage> {
    let visible = visible_region(rect, viewport)?;

    let scale_x = scale(screenshot.width(), viewport.width, viewport.device_pixel_ratio);
    let scale_y = scale(screenshot.height(), viewport.height, viewport.device_pixel_ratio);

    let left = ((visible.x - viewport.scroll_x) * scale_x).floor().max(0.0) as u32;
    let top = ((visible.y - viewport.scroll_y) * scale_y).floor().max(0.0) as u32;
    let right = (((visible.right() - viewport.scroll_x) * scale_x).ceil().max(0.0) as u32)
        .min(screenshot.width());
    let bottom = (((visible.bottom() - viewport.scroll_y) * scale_y).ceil().max(0.0) as u32)
        .min(screenshot.height());

    if right <= left || bottom <= top {
        return Err(PageSnapError::InvalidRegion);
    }

    log::debug!(
        "[CAPTURE] crop {}x{} at ({}, {}) from {}x{}",
        right - left,
        bottom - top,
        left,
        top,
        screenshot.width(),
        screenshot.height()
    );

    Ok(imageops::crop_imm(screenshot, left, top, right - left, bottom - top).to_image())
}

fn scale(image_px: u32, css_px: f64, fallback: f64) -> f64 {
    if css_px > 0.0 {
        image_px as f64 / css_px
    } else if fallback > 0.0 {
        fallback
    } else {
        1.0
    }
}
