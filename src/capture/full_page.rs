//! Full-page capture by scrolling and stitching.
//!
//! Captures are viewport-bounded, so the whole document is captured as a
//! grid of viewport-sized tiles. Tiles in the last row/column are pulled back
//! to the document edge instead of overhanging it; where they overlap the
//! previous tile, the later tile wins.

use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};

use super::{CaptureMode, CapturedImage, TabCapture};
use crate::capture_overlay::{SelectionRect, Viewport};
use crate::error::{PageSnapError, PageSnapResult};

/// Largest stitched edge in device pixels (browser canvas limit).
pub const MAX_STITCHED_DIMENSION: u32 = 32_767;

/// Scrollable size of the document in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSize {
    pub width: f64,
    pub height: f64,
}

impl DocumentSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scroll offset of one tile, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Offsets along one axis: steps of `view`, the last one pulled back so it
/// ends at `total`.
fn axis_offsets(total: f64, view: f64) -> Vec<f64> {
    if view <= 0.0 || total <= view {
        return vec![0.0];
    }
    let last = total - view;
    let mut offsets = Vec::new();
    let mut at = 0.0;
    while at < last {
        offsets.push(at);
        at += view;
    }
    offsets.push(last);
    offsets
}

/// Scroll positions needed to cover the document, row-major.
pub fn plan_full_page_tiles(document: DocumentSize, viewport: &Viewport) -> Vec<TilePosition> {
    let xs = axis_offsets(document.width, viewport.width);
    let ys = axis_offsets(document.height, viewport.height);
    ys.iter()
        .flat_map(|&y| {
            xs.iter().map(move |&x| TilePosition {
                scroll_x: x,
                scroll_y: y,
            })
        })
        .collect()
}

/// Size of the stitched image in image pixels, or an error past the
/// canvas limit.
fn stitched_size(document: DocumentSize, scale: f64) -> PageSnapResult<(u32, u32)> {
    let width = (document.width * scale).round().max(1.0);
    let height = (document.height * scale).round().max(1.0);
    if width > MAX_STITCHED_DIMENSION as f64 || height > MAX_STITCHED_DIMENSION as f64 {
        return Err(PageSnapError::Capture(format!(
            "page too large to stitch ({}x{})",
            width, height
        )));
    }
    Ok((width as u32, height as u32))
}

/// Compose captured tiles into one image. `scale` converts CSS pixels to
/// image pixels.
pub fn stitch_tiles(
    document: DocumentSize,
    tiles: &[(TilePosition, RgbaImage)],
    scale: f64,
) -> PageSnapResult<RgbaImage> {
    if tiles.is_empty() {
        return Err(PageSnapError::Capture("no tiles to stitch".to_string()));
    }

    let (width, height) = stitched_size(document, scale)?;
    let mut canvas = RgbaImage::new(width, height);
    for (pos, tile) in tiles {
        let x = (pos.scroll_x * scale).round() as i64;
        let y = (pos.scroll_y * scale).round() as i64;
        imageops::replace(&mut canvas, tile, x, y);
    }
    Ok(canvas)
}

/// Capture the whole document. The original scroll position is restored
/// afterwards, also when a tile fails.
pub async fn capture_full_page<T: TabCapture>(
    tab: &T,
    document: DocumentSize,
) -> PageSnapResult<CapturedImage> {
    let original = tab.viewport();
    // Reject before scrolling the user's tab through every tile
    stitched_size(document, original.device_pixel_ratio)?;
    let plan = plan_full_page_tiles(document, &original);
    log::info!("[CAPTURE] Full page: {} tiles", plan.len());

    let result = capture_tiles(tab, &plan).await;

    if let Err(e) = tab.scroll_to(original.scroll_x, original.scroll_y).await {
        log::warn!("[CAPTURE] Failed to restore scroll position: {}", e);
    }

    let (tiles, scale) = result?;
    let image = stitch_tiles(document, &tiles, scale)?;
    Ok(CapturedImage {
        image,
        mode: CaptureMode::FullPage,
        source_rect: SelectionRect::new(0.0, 0.0, document.width, document.height),
    })
}

async fn capture_tiles<T: TabCapture>(
    tab: &T,
    plan: &[TilePosition],
) -> PageSnapResult<(Vec<(TilePosition, RgbaImage)>, f64)> {
    let mut tiles = Vec::with_capacity(plan.len());
    let mut scale = 1.0;

    for (i, pos) in plan.iter().enumerate() {
        tab.scroll_to(pos.scroll_x, pos.scroll_y).await?;
        // The page may clamp the scroll; place the tile where it really is
        let viewport = tab.viewport();
        let image = tab.capture_visible().await?;
        if i == 0 && viewport.width > 0.0 {
            scale = image.width() as f64 / viewport.width;
        }
        tiles.push((
            TilePosition {
                scroll_x: viewport.scroll_x,
                scroll_y: viewport.scroll_y,
            },
            image,
        ));
    }

    Ok((tiles, scale))
}
