//! Sidebar host.
//!
//! The floating panel the content script injects into the page. It owns
//! its own portal, the capture overlay controller (one per page, created
//! with the sidebar and torn down with it), the gallery and the notice area.
//!
//! ```text
//! SidebarHost
//!   |
//!   +-- layout.rs (side, collapse, drag, clamping)
//!   +-- animation.rs (slide in/out)
//!   +-- gallery.rs (capture thumbnails)
//!   +-- notifications.rs (transient notices)
//!   +-- CaptureOverlayController --OverlayEvent--> process_events()
//! ```

pub mod animation;
pub mod gallery;
pub mod layout;
pub mod notifications;

#[cfg(test)]
mod tests;

pub use animation::{SlideAnimation, SlideDirection, SLIDE_DURATION_MS};
pub use gallery::{CaptureEntry, Gallery};
pub use layout::{HeaderDrag, Position, Side, SidebarState, Size, COLLAPSED_WIDTH, EXPANDED_WIDTH};
pub use notifications::{Notice, NoticeLevel, Notifications};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::capture::CapturedImage;
use crate::capture_overlay::{CaptureOverlayController, OverlayEvent, Portal, PortalHost, Viewport};
use crate::config::SettingsHandle;

/// DOM id of the sidebar root appended to `document.body`
pub const SIDEBAR_ROOT_ID: &str = "pagesnap-sidebar";

/// What the panel painter draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarFrame {
    pub visible: bool,
    pub side: Side,
    pub collapsed: bool,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Horizontal slide offset towards the anchored edge (0 = in place)
    pub offset_x: f64,
    pub entries: Vec<CaptureEntry>,
    pub notices: Vec<Notice>,
    pub selecting: bool,
}

pub struct SidebarHost<H: PortalHost + Clone> {
    portal: Portal<H>,
    overlay: CaptureOverlayController<H>,
    events: UnboundedReceiver<OverlayEvent>,
    state: SidebarState,
    animation: Option<SlideAnimation>,
    drag: Option<HeaderDrag>,
    gallery: Gallery,
    notices: Notifications,
    settings: SettingsHandle,
    viewport: Viewport,
}

impl<H: PortalHost + Clone> SidebarHost<H> {
    pub fn new(host: H, viewport: Viewport, settings: SettingsHandle) -> Self {
        let snapshot = settings.snapshot();
        let (tx, rx) = unbounded_channel();
        Self {
            portal: Portal::new(host.clone(), SIDEBAR_ROOT_ID),
            overlay: CaptureOverlayController::new(host, viewport, tx),
            events: rx,
            state: SidebarState::new(snapshot.default_side, viewport.width, viewport.height),
            animation: None,
            drag: None,
            gallery: Gallery::new(snapshot.max_thumbnails),
            notices: Notifications::new(),
            settings,
            viewport,
        }
    }

    pub fn state(&self) -> &SidebarState {
        &self.state
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub fn notices(&self) -> &Notifications {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notifications {
        &mut self.notices
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn portal(&self) -> &Portal<H> {
        &self.portal
    }

    pub fn overlay(&self) -> &CaptureOverlayController<H> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut CaptureOverlayController<H> {
        &mut self.overlay
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    // ------------------------------------------------------------------
    // Show / hide
    // ------------------------------------------------------------------

    /// Mount and slide in. Returns false when the panel could not be
    /// mounted.
    pub fn show(&mut self, now_ms: f64) -> bool {
        if self.state.visible && !matches!(self.animation, Some(a) if a.direction == SlideDirection::Out) {
            return true;
        }
        if !self.portal.mount() {
            log::error!("[SIDEBAR] Could not mount sidebar");
            return false;
        }
        self.animation = Some(match self.animation {
            Some(previous) => SlideAnimation::reverse_from(&previous, SlideDirection::In, now_ms),
            None => SlideAnimation::new(SlideDirection::In, now_ms),
        });
        self.state.visible = true;
        self.state.clamp(self.viewport.width, self.viewport.height);
        log::info!("[SIDEBAR] Shown on {:?}", self.state.side);
        true
    }

    /// Start sliding out. The panel stays visible until `tick` sees the
    /// animation finish.
    pub fn hide(&mut self, now_ms: f64) {
        if !self.state.visible {
            return;
        }
        if matches!(self.animation, Some(a) if a.direction == SlideDirection::Out) {
            return;
        }
        self.overlay.cancel();
        self.animation = Some(match self.animation {
            Some(previous) => SlideAnimation::reverse_from(&previous, SlideDirection::Out, now_ms),
            None => SlideAnimation::new(SlideDirection::Out, now_ms),
        });
        self.drag = None;
        log::debug!("[SIDEBAR] Hiding");
    }

    pub fn toggle(&mut self, now_ms: f64) {
        let hiding = matches!(self.animation, Some(a) if a.direction == SlideDirection::Out);
        if self.state.visible && !hiding {
            self.hide(now_ms);
        } else {
            self.show(now_ms);
        }
    }

    /// Advance the slide animation and expire notices. Returns true while
    /// the panel needs repainting.
    pub fn tick(&mut self, now_ms: f64, now: DateTime<Utc>) -> bool {
        let mut changed = self.notices.expire(now);
        if let Some(animation) = self.animation {
            changed = true;
            if animation.is_finished(now_ms) {
                self.animation = None;
                if animation.direction == SlideDirection::Out {
                    self.state.visible = false;
                    self.portal.unmount();
                    log::info!("[SIDEBAR] Hidden");
                }
            }
        }
        changed
    }

    /// Tear everything down immediately (close button, page unload).
    pub fn close(&mut self) {
        self.overlay.close();
        self.portal.unmount();
        self.animation = None;
        self.drag = None;
        self.state.visible = false;
        log::info!("[SIDEBAR] Closed");
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    pub fn toggle_collapsed(&mut self) {
        self.state.toggle_collapsed(self.viewport.width, self.viewport.height);
    }

    pub fn set_side(&mut self, side: Side) {
        self.state.set_side(side, self.viewport.width, self.viewport.height);
    }

    pub fn begin_header_drag(&mut self, pointer_y: f64) {
        self.drag = Some(self.state.begin_drag(pointer_y));
    }

    /// Returns false when no header drag is in progress.
    pub fn drag_header(&mut self, pointer_x: f64, pointer_y: f64) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        self.state
            .drag_to(&drag, pointer_x, pointer_y, self.viewport.width, self.viewport.height);
        true
    }

    pub fn end_header_drag(&mut self) {
        self.drag = None;
    }

    pub fn resize_height(&mut self, height: f64) {
        self.state.resize_height(height, self.viewport.width, self.viewport.height);
    }

    /// Window resized: reclamp against the new size and hand the fresh
    /// metrics to the overlay.
    pub fn on_window_resize(&mut self, viewport: Viewport) {
        self.sync_viewport(viewport);
    }

    fn sync_viewport(&mut self, viewport: Viewport) {
        if (viewport.width, viewport.height) != (self.viewport.width, self.viewport.height) {
            self.state.clamp(viewport.width, viewport.height);
        }
        self.viewport = viewport;
        self.overlay.set_viewport(viewport);
    }

    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    /// "Area capture" button: open the overlay in selecting mode. The page
    /// may have scrolled while the overlay was closed, so `viewport` must be
    /// read from the window right before the call.
    pub fn request_area_capture(&mut self, viewport: Viewport) -> bool {
        if self.overlay.is_open() {
            return true;
        }
        self.sync_viewport(viewport);
        let opened = self.overlay.open();
        if !opened {
            self.notices.push(
                NoticeLevel::Error,
                "Area capture is not available on this page.",
                Utc::now(),
            );
        }
        opened
    }

    /// Drain overlay events: captures become thumbnails, failures become
    /// notices. Returns the number of events handled.
    pub fn process_events(&mut self, now: DateTime<Utc>) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            match event {
                OverlayEvent::Opened => log::debug!("[SIDEBAR] Area selection started"),
                OverlayEvent::Cancelled => log::debug!("[SIDEBAR] Area selection cancelled"),
                OverlayEvent::Captured(captured) => {
                    self.record_capture(&captured, now);
                }
                OverlayEvent::CaptureFailed(message) => {
                    self.notices.push(NoticeLevel::Error, message, now);
                }
            }
        }
        handled
    }

    /// Encode a capture and add it to the gallery. Encoding failures are
    /// reported as a notice. Returns the new entry's id.
    pub fn record_capture(&mut self, captured: &CapturedImage, now: DateTime<Utc>) -> Option<String> {
        let settings = self.settings.snapshot();
        self.gallery.set_max_entries(settings.max_thumbnails);
        match CaptureEntry::from_capture(captured, &settings, now) {
            Ok(entry) => {
                let id = entry.id.clone();
                log::info!(
                    "[SIDEBAR] Added {:?} capture {}x{}",
                    entry.mode,
                    entry.width,
                    entry.height
                );
                self.gallery.add(entry);
                self.notices.push(NoticeLevel::Success, "Screenshot captured", now);
                Some(id)
            }
            Err(e) => {
                log::error!("[SIDEBAR] Failed to encode capture: {}", e);
                self.notices.push(NoticeLevel::Error, e.user_message(), now);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Painting
    // ------------------------------------------------------------------

    pub fn frame(&self, now_ms: f64) -> SidebarFrame {
        let shown = self
            .animation
            .map(|a| a.shown_fraction(now_ms))
            .unwrap_or(if self.state.visible { 1.0 } else { 0.0 });
        let travel = self.state.size.width + layout::MARGIN;
        let offset_x = match self.state.side {
            Side::Left => -(1.0 - shown) * travel,
            Side::Right => (1.0 - shown) * travel,
        };

        SidebarFrame {
            visible: self.state.visible,
            side: self.state.side,
            collapsed: self.state.collapsed,
            left: self.state.position.x,
            top: self.state.position.y,
            width: self.state.size.width,
            height: self.state.size.height,
            offset_x,
            entries: self.gallery.entries().cloned().collect(),
            notices: self.notices.active().to_vec(),
            selecting: self.overlay.is_open(),
        }
    }
}
