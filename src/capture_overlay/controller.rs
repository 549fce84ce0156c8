//! Capture overlay controller.
//!
//! Composes the state machine, portal, hit-testing and frame builder into
//! the interactive area-capture UI. The browser binding feeds it raw input
//! (client coordinates, keys, scroll/resize) and paints `frame()` whenever a
//! call answers `OverlayCommand::Repaint`.
//!
//! Results flow back to the sidebar through an unbounded channel of
//! `OverlayEvent`s, so the controller never needs a reference to its
//! consumer.

use tokio::sync::mpsc::UnboundedSender;

use crate::capture::{CaptureBackend, CapturedImage};
use crate::error::{OptionExt, PageSnapError, PageSnapResult};

use super::coords::{Viewport, ViewportPoint};
use super::handles::hit_test;
use super::portal::{Portal, PortalHost};
use super::render::{build_frame, OverlayFrame};
use super::state::SelectionStateMachine;
use super::types::{Grip, InteractionState, OverlayCommand, SelectionRect, OVERLAY_ROOT_ID};

/// Notifications for whoever opened the overlay.
#[derive(Debug, Clone)]
pub enum OverlayEvent {
    Opened,
    /// Dismissed without capturing
    Cancelled,
    Captured(CapturedImage),
    /// Capture failed; the selection is still there for a retry
    CaptureFailed(String),
}

/// Keys the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKey {
    Escape,
    Enter,
}

impl OverlayKey {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Self::Escape),
            "Enter" => Some(Self::Enter),
            _ => None,
        }
    }
}

/// Proof that a selection was committed; redeemed by `finish_capture`.
#[derive(Debug)]
#[must_use]
pub struct CaptureTicket {
    session: u64,
    rect: SelectionRect,
}

impl CaptureTicket {
    pub fn rect(&self) -> SelectionRect {
        self.rect
    }
}

pub struct CaptureOverlayController<H: PortalHost> {
    machine: SelectionStateMachine,
    portal: Portal<H>,
    viewport: Viewport,
    /// Grip under the pointer while a selection is finalized
    hover: Option<Grip>,
    /// Last pointer position, re-applied when the page scrolls mid-drag
    pointer: Option<ViewportPoint>,
    /// Bumped on every open so late capture results of an earlier session
    /// are recognised
    session: u64,
    open: bool,
    events: UnboundedSender<OverlayEvent>,
}

impl<H: PortalHost> CaptureOverlayController<H> {
    pub fn new(host: H, viewport: Viewport, events: UnboundedSender<OverlayEvent>) -> Self {
        Self {
            machine: SelectionStateMachine::new(),
            portal: Portal::new(host, OVERLAY_ROOT_ID),
            viewport,
            hover: None,
            pointer: None,
            session: 0,
            open: false,
            events,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.machine.rect()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn portal(&self) -> &Portal<H> {
        &self.portal
    }

    /// Everything the painter needs for the current state.
    pub fn frame(&self) -> OverlayFrame {
        build_frame(&self.machine, &self.viewport, self.hover)
    }

    fn emit(&self, event: OverlayEvent) {
        if self.events.send(event).is_err() {
            log::debug!("[OVERLAY] No listener for overlay events");
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Mount the overlay in `idle`. Returns false when the portal could not
    /// be mounted; the page is left untouched in that case.
    pub fn open(&mut self) -> bool {
        if self.open {
            return true;
        }
        if !self.portal.mount() {
            log::error!("[OVERLAY] Could not mount overlay, area capture unavailable");
            return false;
        }
        self.machine = SelectionStateMachine::new();
        self.hover = None;
        self.pointer = None;
        self.session += 1;
        self.open = true;
        log::info!("[OVERLAY] Opened (session {})", self.session);
        self.emit(OverlayEvent::Opened);
        true
    }

    /// Unmount and forget the selection. Silent: emits nothing.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.portal.unmount();
        self.machine = SelectionStateMachine::new();
        self.hover = None;
        self.pointer = None;
        self.open = false;
        log::debug!("[OVERLAY] Closed");
    }

    /// User dismissed the overlay (cancel button or Escape). Ignored while a
    /// capture is in flight.
    pub fn cancel(&mut self) -> OverlayCommand {
        if !self.open {
            return OverlayCommand::None;
        }
        if self.machine.state() == InteractionState::Capturing {
            log::debug!("[OVERLAY] Cancel ignored while capturing");
            return OverlayCommand::None;
        }
        self.close();
        log::info!("[OVERLAY] Cancelled");
        self.emit(OverlayEvent::Cancelled);
        OverlayCommand::Closed
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Page scrolled: the selection stays in page space, so only its
    /// on-screen position changes. A drag in progress follows the pointer's
    /// new page position.
    pub fn on_scroll(&mut self, scroll_x: f64, scroll_y: f64) -> OverlayCommand {
        self.set_viewport(self.viewport.scrolled_to(scroll_x, scroll_y))
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> OverlayCommand {
        self.viewport = viewport;
        if !self.open {
            return OverlayCommand::None;
        }
        if let Some(pointer) = self.pointer {
            match self.machine.state() {
                InteractionState::Selecting | InteractionState::Resizing => {
                    return self.pointer_move(pointer.x, pointer.y);
                }
                // The content moved under a still pointer
                InteractionState::Selected => {
                    let page = self.viewport.to_page_coords(pointer.x, pointer.y);
                    self.hover = self
                        .machine
                        .rect()
                        .and_then(|rect| hit_test(&rect, page.x, page.y));
                }
                _ => {}
            }
        }
        OverlayCommand::Repaint
    }

    // ------------------------------------------------------------------
    // Pointer input (client coordinates)
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> OverlayCommand {
        if !self.open {
            return OverlayCommand::None;
        }
        self.pointer = Some(ViewportPoint::new(client_x, client_y));
        let page = self.viewport.to_page_coords(client_x, client_y);

        let result = match self.machine.state() {
            InteractionState::Idle => self.machine.begin_selection(page.x, page.y),
            // A pointer-up got lost (released outside the window)
            InteractionState::Selecting => self.machine.restart(page.x, page.y),
            InteractionState::Resizing => {
                log::debug!("[OVERLAY] Recovering from missed pointer-up");
                self.machine
                    .end_resize()
                    .and_then(|_| self.grab(page.x, page.y))
            }
            InteractionState::Selected => self.grab(page.x, page.y),
            InteractionState::Capturing => return OverlayCommand::None,
        };

        self.hover = None;
        self.settle(result)
    }

    /// Pointer-down on a finalized selection: handle, body or elsewhere.
    fn grab(&mut self, page_x: f64, page_y: f64) -> PageSnapResult<()> {
        let rect = self.machine.rect().context("no selection to grab")?;
        match hit_test(&rect, page_x, page_y) {
            Some(Grip::Handle(key)) => self.machine.begin_resize(key, page_x, page_y),
            Some(Grip::Body) => self.machine.begin_move(page_x, page_y),
            None => self.machine.restart(page_x, page_y),
        }
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) -> OverlayCommand {
        if !self.open {
            return OverlayCommand::None;
        }
        self.pointer = Some(ViewportPoint::new(client_x, client_y));
        let page = self.viewport.to_page_coords(client_x, client_y);

        match self.machine.state() {
            InteractionState::Selecting => {
                let result = self.machine.update_selection(page.x, page.y).map(|_| ());
                self.settle(result)
            }
            InteractionState::Resizing => {
                let result = self.machine.update_resize(page.x, page.y).map(|_| ());
                self.settle(result)
            }
            InteractionState::Selected => {
                let hover = self
                    .machine
                    .rect()
                    .and_then(|rect| hit_test(&rect, page.x, page.y));
                if hover != self.hover {
                    self.hover = hover;
                    OverlayCommand::Repaint
                } else {
                    OverlayCommand::None
                }
            }
            _ => OverlayCommand::None,
        }
    }

    pub fn pointer_up(&mut self, client_x: f64, client_y: f64) -> OverlayCommand {
        if !self.open {
            return OverlayCommand::None;
        }
        // Apply the final position before finishing the gesture
        if matches!(
            self.machine.state(),
            InteractionState::Selecting | InteractionState::Resizing
        ) {
            self.pointer_move(client_x, client_y);
        }
        self.pointer = None;

        let result = match self.machine.state() {
            InteractionState::Selecting => self.machine.end_selection().map(|rect| {
                if let Some(rect) = rect {
                    log::debug!(
                        "[OVERLAY] Selection {}x{} at ({}, {})",
                        rect.width,
                        rect.height,
                        rect.x,
                        rect.y
                    );
                }
            }),
            InteractionState::Resizing => self.machine.end_resize().map(|_| ()),
            _ => return OverlayCommand::None,
        };
        self.settle(result)
    }

    fn settle(&mut self, result: PageSnapResult<()>) -> OverlayCommand {
        match result {
            Ok(()) => OverlayCommand::Repaint,
            Err(e) => {
                log::warn!("[OVERLAY] {}", e);
                OverlayCommand::None
            }
        }
    }

    // ------------------------------------------------------------------
    // Keyboard / buttons
    // ------------------------------------------------------------------

    pub fn key_down(&mut self, key: OverlayKey) -> OverlayCommand {
        if !self.open {
            return OverlayCommand::None;
        }
        match key {
            OverlayKey::Escape => self.cancel(),
            OverlayKey::Enter => self.capture_clicked(),
        }
    }

    /// Capture button (or Enter): asks the binding to start the capture.
    pub fn capture_clicked(&mut self) -> OverlayCommand {
        if self.open && self.machine.state() == InteractionState::Selected {
            OverlayCommand::Capture
        } else {
            OverlayCommand::None
        }
    }

    // ------------------------------------------------------------------
    // Capture hand-off
    // ------------------------------------------------------------------

    /// Commit the selection. The overlay paints itself invisible from now
    /// until `finish_capture`, so it does not end up in the screenshot.
    pub fn begin_capture(&mut self) -> PageSnapResult<CaptureTicket> {
        if !self.open {
            return Err(PageSnapError::Other("overlay is not open".to_string()));
        }
        let rect = self.machine.commit()?;
        self.hover = None;
        self.pointer = None;
        log::info!(
            "[OVERLAY] Capturing {}x{} at ({}, {})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Ok(CaptureTicket {
            session: self.session,
            rect,
        })
    }

    /// Resolve a capture started with `begin_capture`. Success ends the
    /// session; failure puts the selection back on screen.
    pub fn finish_capture(
        &mut self,
        ticket: CaptureTicket,
        result: PageSnapResult<CapturedImage>,
    ) -> OverlayCommand {
        if !self.open
            || ticket.session != self.session
            || self.machine.state() != InteractionState::Capturing
        {
            log::warn!("[OVERLAY] Dropping capture result of a closed session");
            return OverlayCommand::None;
        }

        match result {
            Ok(image) => {
                if let Err(e) = self.machine.complete_capture() {
                    log::warn!("[OVERLAY] {}", e);
                }
                self.close();
                log::info!("[OVERLAY] Captured {}x{}", image.width(), image.height());
                self.emit(OverlayEvent::Captured(image));
                OverlayCommand::Closed
            }
            Err(e) => {
                log::error!("[OVERLAY] Capture failed: {}", e);
                if let Err(err) = self.machine.fail_capture() {
                    log::warn!("[OVERLAY] {}", err);
                }
                self.emit(OverlayEvent::CaptureFailed(e.user_message()));
                OverlayCommand::Repaint
            }
        }
    }

    /// `begin_capture` + backend + `finish_capture` in one go, for callers
    /// that can hold the controller across the await.
    pub async fn capture_with<B: CaptureBackend + ?Sized>(&mut self, backend: &B) -> OverlayCommand {
        let ticket = match self.begin_capture() {
            Ok(ticket) => ticket,
            Err(e) => {
                log::warn!("[OVERLAY] {}", e);
                return OverlayCommand::None;
            }
        };
        let result = backend.capture(ticket.rect()).await;
        self.finish_capture(ticket, result)
    }
}
