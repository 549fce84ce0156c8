//! Content-script state shared by listeners, timers and the JS API.
//!
//! Everything runs on the page's event loop. The state sits behind one
//! `Rc<RefCell<App>>`; listeners and timers keep a `Weak` so dropping the
//! content script frees it. No borrow is held across an `.await`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::Utc;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::future::TimeoutFuture;
use pagesnap::capture::{capture_full_page, CaptureBackend, CaptureMode, VisibleAreaCapture};
use pagesnap::capture_overlay::{CaptureOverlayController, OverlayCommand};
use pagesnap::config::{ExtensionSettings, SettingsHandle};
use pagesnap::sidebar::notifications::NOTICE_TTL_SECS;
use pagesnap::sidebar::{CaptureEntry, NoticeLevel, SidebarHost};
use pagesnap::{PageSnapError, PageSnapResult};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Window};

use crate::chrome_capture::{
    now_ms, post_message, read_document_size, read_viewport, BackgroundMessage, ChromeTab,
};
use crate::dom_portal::DomHost;
use crate::listeners::{OverlayListeners, SidebarListeners, WindowListeners};
use crate::overlay_view::OverlayView;
use crate::sidebar_view::{PanelAction, SidebarView};

/// Time for the hidden overlay and panel to leave the screen before the
/// screenshot is taken
const HIDE_SETTLE_MS: u32 = 60;

/// Notice expiry check runs this long after the TTL
const EXPIRY_SLACK_MS: u32 = 100;

pub type SharedApp = Rc<RefCell<App>>;
pub type WeakApp = Weak<RefCell<App>>;

pub struct App {
    window: Window,
    document: Document,
    sidebar: SidebarHost<DomHost>,
    overlay_view: Option<OverlayView>,
    overlay_listeners: Option<OverlayListeners>,
    sidebar_view: Option<SidebarView>,
    sidebar_listeners: Option<SidebarListeners>,
    window_listeners: Option<WindowListeners>,
    animation_frame: Option<AnimationFrame>,
    expiry_pending: bool,
    capture_in_flight: bool,
}

impl App {
    pub fn create(window: Window, settings: SettingsHandle) -> PageSnapResult<SharedApp> {
        let document = window
            .document()
            .ok_or_else(|| PageSnapError::Portal("window has no document".to_string()))?;
        let viewport = read_viewport(&window);
        let sidebar = SidebarHost::new(DomHost::new(document.clone()), viewport, settings);

        let app = Rc::new(RefCell::new(App {
            window: window.clone(),
            document,
            sidebar,
            overlay_view: None,
            overlay_listeners: None,
            sidebar_view: None,
            sidebar_listeners: None,
            window_listeners: None,
            animation_frame: None,
            expiry_pending: false,
            capture_in_flight: false,
        }));
        let listeners = WindowListeners::install(&Rc::downgrade(&app), &window);
        app.borrow_mut().window_listeners = Some(listeners);
        log::info!(
            "[SIDEBAR] Content script ready ({}x{})",
            viewport.width,
            viewport.height
        );
        Ok(app)
    }

    pub fn sidebar(&self) -> &SidebarHost<DomHost> {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut SidebarHost<DomHost> {
        &mut self.sidebar
    }

    pub fn overlay_mut(&mut self) -> &mut CaptureOverlayController<DomHost> {
        self.sidebar.overlay_mut()
    }

    pub fn now_ms(&self) -> f64 {
        now_ms(&self.window)
    }

    pub fn paint_overlay(&self) {
        let Some(view) = &self.overlay_view else {
            return;
        };
        let overlay = self.sidebar.overlay();
        if let Err(e) = view.paint(&overlay.frame(), &overlay.viewport()) {
            log::warn!("[OVERLAY] Paint failed: {:?}", e);
        }
    }

    pub fn paint_sidebar(&mut self) {
        let frame = self.sidebar.frame(self.now_ms());
        let theme = self.sidebar.settings().snapshot().theme;
        if let Some(view) = self.sidebar_view.as_mut() {
            if let Err(e) = view.paint(&frame, theme) {
                log::warn!("[SIDEBAR] Paint failed: {:?}", e);
            }
        }
    }

    /// Keep the panel out of screenshots.
    fn set_panel_hidden(&self, hidden: bool) {
        let Some(root) = self.sidebar.portal().root() else {
            return;
        };
        let visibility = if hidden { "hidden" } else { "visible" };
        if let Err(e) = root.style().set_property("visibility", visibility) {
            log::warn!("[SIDEBAR] Failed to set visibility: {:?}", e);
        }
    }

    /// Drain overlay events; returns the gallery entry they added, if any.
    fn drain_events(&mut self) -> Option<CaptureEntry> {
        let before = self.sidebar.gallery().latest().map(|e| e.id.clone());
        if self.sidebar.process_events(Utc::now()) == 0 {
            return None;
        }
        self.sidebar
            .gallery()
            .latest()
            .filter(|e| Some(&e.id) != before.as_ref())
            .cloned()
    }

    /// Build views (and their listeners) for freshly mounted portals and
    /// drop the ones whose portal went away.
    fn sync_views(&mut self, app: &WeakApp) {
        let overlay_root = self.sidebar.overlay().portal().root().cloned();
        let stale = match (&overlay_root, &self.overlay_view) {
            (Some(root), Some(view)) => view.root() != root,
            (None, Some(_)) => true,
            _ => false,
        };
        if stale {
            self.overlay_listeners = None;
            self.overlay_view = None;
        }
        if let Some(root) = overlay_root.filter(|_| self.overlay_view.is_none()) {
            match OverlayView::build(&self.document, &root) {
                Ok(view) => {
                    self.overlay_listeners = Some(OverlayListeners::install(app, &view, &self.window));
                    self.overlay_view = Some(view);
                }
                Err(e) => {
                    log::error!("[OVERLAY] Failed to build overlay: {:?}", e);
                    self.sidebar.overlay_mut().close();
                    self.sidebar.notices_mut().push(
                        NoticeLevel::Error,
                        "Area capture is not available on this page.",
                        Utc::now(),
                    );
                }
            }
        }

        let sidebar_root = self.sidebar.portal().root().cloned();
        let stale = match (&sidebar_root, &self.sidebar_view) {
            (Some(root), Some(view)) => view.root() != root,
            (None, Some(_)) => true,
            _ => false,
        };
        if stale {
            self.sidebar_listeners = None;
            self.sidebar_view = None;
        }
        if let Some(root) = sidebar_root.filter(|_| self.sidebar_view.is_none()) {
            match SidebarView::build(&self.document, &root) {
                Ok(view) => {
                    self.sidebar_listeners = Some(SidebarListeners::install(app, &view));
                    self.sidebar_view = Some(view);
                }
                Err(e) => {
                    log::error!("[SIDEBAR] Failed to build panel: {:?}", e);
                    self.sidebar.close();
                }
            }
        }
    }
}

/// Drain events, reconcile views with their portals and repaint.
pub fn refresh(app: &SharedApp) {
    let weak = Rc::downgrade(app);
    let (new_entry, schedule) = {
        let mut inner = app.borrow_mut();
        let new_entry = inner.drain_events();
        inner.sync_views(&weak);
        inner.paint_overlay();
        inner.paint_sidebar();
        let schedule = !inner.expiry_pending && !inner.sidebar.notices().is_empty();
        if schedule {
            inner.expiry_pending = true;
        }
        (new_entry, schedule)
    };
    if let Some(entry) = new_entry {
        deliver(app, &entry);
    }
    if schedule {
        schedule_expiry(app);
    }
}

/// Follow up on what the overlay controller asked for.
pub fn apply(app: &SharedApp, command: OverlayCommand) {
    match command {
        OverlayCommand::None => {}
        OverlayCommand::Repaint => app.borrow().paint_overlay(),
        OverlayCommand::Capture => run_area_capture(app),
        OverlayCommand::Closed => refresh(app),
    }
}

// ----------------------------------------------------------------------
// Show / hide
// ----------------------------------------------------------------------

pub fn show(app: &SharedApp) -> bool {
    let shown = {
        let mut inner = app.borrow_mut();
        let now = inner.now_ms();
        inner.sidebar.show(now)
    };
    refresh(app);
    schedule_frame(app);
    shown
}

pub fn hide(app: &SharedApp) {
    {
        let mut inner = app.borrow_mut();
        let now = inner.now_ms();
        inner.sidebar.hide(now);
    }
    refresh(app);
    schedule_frame(app);
}

pub fn toggle(app: &SharedApp) {
    {
        let mut inner = app.borrow_mut();
        let now = inner.now_ms();
        inner.sidebar.toggle(now);
    }
    refresh(app);
    schedule_frame(app);
}

/// Remove everything from the page right away.
pub fn close(app: &SharedApp) {
    let Ok(mut inner) = app.try_borrow_mut() else {
        log::warn!("[SIDEBAR] Close requested while busy");
        return;
    };
    inner.sidebar.close();
    inner.animation_frame = None;
    inner.overlay_listeners = None;
    inner.overlay_view = None;
    inner.sidebar_listeners = None;
    inner.sidebar_view = None;
}

/// Drive the slide animation one frame at a time until it settles.
fn schedule_frame(app: &SharedApp) {
    if !app.borrow().sidebar.is_animating() {
        return;
    }
    let weak = Rc::downgrade(app);
    let handle = request_animation_frame(move |timestamp| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        {
            let mut inner = app.borrow_mut();
            inner.animation_frame.take();
            inner.sidebar.tick(timestamp, Utc::now());
        }
        refresh(&app);
        schedule_frame(&app);
    });
    app.borrow_mut().animation_frame = Some(handle);
}

fn schedule_expiry(app: &SharedApp) {
    let weak = Rc::downgrade(app);
    spawn_local(async move {
        TimeoutFuture::new(NOTICE_TTL_SECS as u32 * 1000 + EXPIRY_SLACK_MS).await;
        let Some(app) = weak.upgrade() else {
            return;
        };
        {
            let mut inner = app.borrow_mut();
            inner.expiry_pending = false;
            let now = inner.now_ms();
            inner.sidebar.tick(now, Utc::now());
        }
        refresh(&app);
    });
}

// ----------------------------------------------------------------------
// Capture
// ----------------------------------------------------------------------

pub fn start_area_capture(app: &SharedApp) -> bool {
    {
        let mut inner = app.borrow_mut();
        if inner.capture_in_flight {
            log::debug!("[OVERLAY] Capture in flight, not opening");
            return false;
        }
        // Scroll listeners only run while the overlay is mounted
        let viewport = read_viewport(&inner.window);
        inner.sidebar.request_area_capture(viewport);
    }
    refresh(app);
    let open = app.borrow().sidebar.overlay().is_open();
    open
}

/// Commit the selection and capture it in the background. The overlay
/// and the panel are hidden until the result is in.
fn run_area_capture(app: &SharedApp) {
    let (ticket, window) = {
        let mut inner = app.borrow_mut();
        let ticket = match inner.sidebar.overlay_mut().begin_capture() {
            Ok(ticket) => ticket,
            Err(e) => {
                log::warn!("[OVERLAY] {}", e);
                return;
            }
        };
        inner.capture_in_flight = true;
        inner.paint_overlay();
        inner.set_panel_hidden(true);
        (ticket, inner.window.clone())
    };

    let weak = Rc::downgrade(app);
    spawn_local(async move {
        TimeoutFuture::new(HIDE_SETTLE_MS).await;
        let backend = VisibleAreaCapture::new(ChromeTab::new(window));
        let result = backend.capture(ticket.rect()).await;

        let Some(app) = weak.upgrade() else {
            return;
        };
        let command = {
            let mut inner = app.borrow_mut();
            inner.capture_in_flight = false;
            inner.set_panel_hidden(false);
            inner.sidebar.overlay_mut().finish_capture(ticket, result)
        };
        // Either way there is an event for the sidebar
        if command != OverlayCommand::None {
            refresh(&app);
        }
    });
}

/// Visible-area or full-page capture straight into the gallery. Area mode
/// only opens the selection overlay. Resolves with the new entry's id.
pub async fn capture_page(app: SharedApp, mode: CaptureMode) -> PageSnapResult<Option<String>> {
    if mode == CaptureMode::Area {
        start_area_capture(&app);
        return Ok(None);
    }

    let cancelled = app.borrow_mut().overlay_mut().cancel();
    apply(&app, cancelled);

    let window = {
        let mut inner = app.borrow_mut();
        if inner.capture_in_flight {
            return Err(PageSnapError::Capture(
                "another capture is in progress".to_string(),
            ));
        }
        inner.capture_in_flight = true;
        inner.set_panel_hidden(true);
        inner.window.clone()
    };

    TimeoutFuture::new(HIDE_SETTLE_MS).await;
    let tab = ChromeTab::new(window.clone());
    let result = match mode {
        CaptureMode::FullPage => match read_document_size(&window) {
            Some(size) => capture_full_page(&tab, size).await,
            None => Err(PageSnapError::Capture("page size is unavailable".to_string())),
        },
        _ => VisibleAreaCapture::new(tab).capture_viewport().await,
    };

    let outcome = {
        let mut inner = app.borrow_mut();
        inner.capture_in_flight = false;
        inner.set_panel_hidden(false);
        match result {
            Ok(captured) => {
                let entry = inner
                    .sidebar
                    .record_capture(&captured, Utc::now())
                    .and_then(|id| inner.sidebar.gallery().get(&id).cloned());
                Ok(entry)
            }
            Err(e) => {
                log::error!("[CAPTURE] {:?} capture failed: {}", mode, e);
                inner
                    .sidebar
                    .notices_mut()
                    .push(NoticeLevel::Error, e.user_message(), Utc::now());
                Err(e)
            }
        }
    };

    if let Ok(Some(entry)) = &outcome {
        deliver(&app, entry);
    }
    refresh(&app);
    outcome.map(|entry| entry.map(|e| e.id))
}

fn spawn_capture(app: &SharedApp, mode: CaptureMode) {
    let app = Rc::clone(app);
    spawn_local(async move {
        if let Err(e) = capture_page(app, mode).await {
            log::warn!("[CAPTURE] {}", e);
        }
    });
}

/// Hand a new capture to the background worker per the user's settings.
fn deliver(app: &SharedApp, entry: &CaptureEntry) {
    let settings = app.borrow().sidebar.settings().snapshot();
    if settings.auto_save {
        download(entry, &settings);
    }
    if settings.copy_to_clipboard {
        post_message(BackgroundMessage::Copy {
            data_url: &entry.data_url,
        });
    }
}

fn download(entry: &CaptureEntry, settings: &ExtensionSettings) {
    let filename = entry.file_name(settings);
    post_message(BackgroundMessage::Download {
        data_url: &entry.data_url,
        filename: &filename,
    });
}

// ----------------------------------------------------------------------
// Panel and window input
// ----------------------------------------------------------------------

pub fn panel_action(app: &SharedApp, action: PanelAction) {
    match action {
        PanelAction::Close => hide(app),
        PanelAction::CaptureArea => {
            start_area_capture(app);
        }
        PanelAction::CaptureVisible => spawn_capture(app, CaptureMode::Viewport),
        PanelAction::CaptureFullPage => spawn_capture(app, CaptureMode::FullPage),
        PanelAction::Download(id) => {
            let inner = app.borrow();
            if let Some(entry) = inner.sidebar.gallery().get(&id) {
                download(entry, &inner.sidebar.settings().snapshot());
            }
        }
        PanelAction::Copy(id) => {
            let inner = app.borrow();
            if let Some(entry) = inner.sidebar.gallery().get(&id) {
                post_message(BackgroundMessage::Copy {
                    data_url: &entry.data_url,
                });
            }
        }
        layout_or_list => {
            {
                let mut inner = app.borrow_mut();
                let sidebar = &mut inner.sidebar;
                match layout_or_list {
                    PanelAction::ToggleCollapsed => sidebar.toggle_collapsed(),
                    PanelAction::SwitchSide => {
                        let side = sidebar.state().side.opposite();
                        sidebar.set_side(side);
                    }
                    PanelAction::ClearGallery => sidebar.gallery_mut().clear(),
                    PanelAction::Remove(id) => {
                        sidebar.gallery_mut().remove(&id);
                    }
                    PanelAction::Dismiss(id) => {
                        sidebar.notices_mut().dismiss(id);
                    }
                    _ => {}
                }
            }
            refresh(app);
        }
    }
}

/// Debounced window resize: reclamp the panel and resize the overlay.
pub fn on_window_resize(app: &SharedApp) {
    {
        let mut inner = app.borrow_mut();
        let viewport = read_viewport(&inner.window);
        inner.sidebar.on_window_resize(viewport);
    }
    refresh(app);
}

pub fn update_settings(app: &SharedApp, settings: ExtensionSettings) {
    {
        let mut inner = app.borrow_mut();
        inner.sidebar.settings().replace(settings);
        let max = inner.sidebar.settings().snapshot().max_thumbnails;
        inner.sidebar.gallery_mut().set_max_entries(max);
    }
    refresh(app);
}
