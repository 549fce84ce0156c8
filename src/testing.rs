//! In-memory stand-ins for the browser, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use image::{Rgba, RgbaImage};

use crate::capture::{CaptureBackend, CaptureMode, CapturedImage, TabCapture};
use crate::capture_overlay::{PortalHost, SelectionRect, Viewport};
use crate::error::{PageSnapError, PageSnapResult};

// ============================================================================
// Portal host
// ============================================================================

#[derive(Debug, Default)]
struct Document {
    next_id: u32,
    /// (node id, element id) of every container attached to the body
    nodes: Vec<(u32, String)>,
    removed: usize,
    fail_create: bool,
}

/// Fake `document.body`. Clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost(Rc<RefCell<Document>>);

impl MemoryHost {
    /// Containers with this element id currently attached.
    pub fn count(&self, id: &str) -> usize {
        self.0.borrow().nodes.iter().filter(|(_, e)| e == id).count()
    }

    pub fn total_nodes(&self) -> usize {
        self.0.borrow().nodes.len()
    }

    pub fn removed(&self) -> usize {
        self.0.borrow().removed
    }

    pub fn fail_create(&self, fail: bool) {
        self.0.borrow_mut().fail_create = fail;
    }
}

impl PortalHost for MemoryHost {
    type Node = u32;

    fn find_root(&self, id: &str) -> Option<u32> {
        self.0
            .borrow()
            .nodes
            .iter()
            .find(|(_, e)| e == id)
            .map(|(n, _)| *n)
    }

    fn create_root(&mut self, id: &str) -> PageSnapResult<u32> {
        let mut doc = self.0.borrow_mut();
        if doc.fail_create {
            return Err(PageSnapError::Portal("body is not available".to_string()));
        }
        doc.next_id += 1;
        let node = doc.next_id;
        doc.nodes.push((node, id.to_string()));
        Ok(node)
    }

    fn remove_root(&mut self, node: &u32) -> PageSnapResult<()> {
        let mut doc = self.0.borrow_mut();
        let before = doc.nodes.len();
        doc.nodes.retain(|(n, _)| n != node);
        if doc.nodes.len() == before {
            return Err(PageSnapError::Portal(format!("node {} is not attached", node)));
        }
        doc.removed += 1;
        Ok(())
    }
}

// ============================================================================
// Tab capture
// ============================================================================

/// Fake tab over a `page_width` x `page_height` document. Every captured
/// pixel encodes its page coordinate: red = x, green = y (mod 256).
pub struct FakeTab {
    viewport: Cell<Viewport>,
    page_width: u32,
    page_height: u32,
    captures: Cell<usize>,
}

impl FakeTab {
    pub fn new(viewport: Viewport, page_width: u32, page_height: u32) -> Self {
        Self {
            viewport: Cell::new(viewport),
            page_width,
            page_height,
            captures: Cell::new(0),
        }
    }

    pub fn captures(&self) -> usize {
        self.captures.get()
    }
}

impl TabCapture for FakeTab {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn capture_visible(&self) -> LocalBoxFuture<'_, PageSnapResult<RgbaImage>> {
        Box::pin(async move {
            self.captures.set(self.captures.get() + 1);
            let vp = self.viewport.get();
            let dpr = vp.device_pixel_ratio;
            let w = (vp.width * dpr).round() as u32;
            let h = (vp.height * dpr).round() as u32;
            Ok(RgbaImage::from_fn(w, h, |x, y| {
                let page_x = vp.scroll_x + x as f64 / dpr;
                let page_y = vp.scroll_y + y as f64 / dpr;
                Rgba([page_x as u32 as u8, page_y as u32 as u8, 0, 255])
            }))
        })
    }

    fn scroll_to(&self, x: f64, y: f64) -> LocalBoxFuture<'_, PageSnapResult<()>> {
        Box::pin(async move {
            let vp = self.viewport.get();
            let max_x = (self.page_width as f64 - vp.width).max(0.0);
            let max_y = (self.page_height as f64 - vp.height).max(0.0);
            self.viewport
                .set(vp.scrolled_to(x.clamp(0.0, max_x), y.clamp(0.0, max_y)));
            Ok(())
        })
    }
}

// ============================================================================
// Capture backend
// ============================================================================

/// Backend answering with queued results; succeeds by default.
#[derive(Default)]
pub struct ScriptedBackend {
    failures: RefCell<VecDeque<String>>,
    calls: RefCell<Vec<SelectionRect>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.failures.borrow_mut().push_back(message.to_string());
    }

    pub fn calls(&self) -> Vec<SelectionRect> {
        self.calls.borrow().clone()
    }
}

impl CaptureBackend for ScriptedBackend {
    fn capture(&self, rect: SelectionRect) -> LocalBoxFuture<'_, PageSnapResult<CapturedImage>> {
        Box::pin(async move {
            self.calls.borrow_mut().push(rect);
            if let Some(message) = self.failures.borrow_mut().pop_front() {
                return Err(PageSnapError::Capture(message));
            }
            let (w, h) = rect.rounded_size();
            Ok(CapturedImage {
                image: RgbaImage::from_pixel(w.max(1), h.max(1), Rgba([0, 128, 255, 255])),
                mode: CaptureMode::Area,
                source_rect: rect,
            })
        })
    }
}
