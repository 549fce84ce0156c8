//! DOM event wiring.
//!
//! Listeners come in groups tied to what they serve: the overlay group lives
//! exactly as long as the overlay view, the panel group as long as the panel,
//! the window group as long as the content script. Dropping a group removes
//! its listeners. Every listener holds a `Weak` app handle.
//!
//! Pointer, key and scroll input is forwarded as it arrives; only the
//! window-resize reclamp is debounced.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::timers::callback::Timeout;
use pagesnap::capture_overlay::{CaptureOverlayController, OverlayCommand, OverlayKey};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent, PointerEvent, Window};

use crate::app::{self, WeakApp};
use crate::dom_portal::DomHost;
use crate::overlay_view::OverlayView;
use crate::sidebar_view::{PanelAction, SidebarView};

const RESIZE_DEBOUNCE_MS: u32 = 150;

fn active() -> EventListenerOptions {
    EventListenerOptions {
        phase: EventListenerPhase::Bubble,
        passive: false,
    }
}

/// Left button, or any touch/pen contact.
fn primary_pointer(event: &Event) -> Option<&PointerEvent> {
    event
        .dyn_ref::<PointerEvent>()
        .filter(|e| e.button() == 0 || e.pointer_type() != "mouse")
}

fn client_point(event: &PointerEvent) -> (f64, f64) {
    (event.client_x() as f64, event.client_y() as f64)
}

/// Feed one input to the overlay controller and act on the result.
fn dispatch(
    app: &WeakApp,
    input: impl FnOnce(&mut CaptureOverlayController<DomHost>) -> OverlayCommand,
) {
    let Some(app) = app.upgrade() else {
        return;
    };
    let command = match app.try_borrow_mut() {
        Ok(mut inner) => input(inner.overlay_mut()),
        Err(_) => {
            log::warn!("[OVERLAY] Input dropped while busy");
            return;
        }
    };
    app::apply(&app, command);
}

// ----------------------------------------------------------------------
// Overlay
// ----------------------------------------------------------------------

pub struct OverlayListeners {
    _listeners: Vec<EventListener>,
}

impl OverlayListeners {
    pub fn install(app: &WeakApp, view: &OverlayView, window: &Window) -> Self {
        let mut listeners = Vec::new();
        let root = view.root().clone();

        let weak = app.clone();
        let target = root.clone();
        listeners.push(EventListener::new_with_options(
            &root,
            "pointerdown",
            active(),
            move |event| {
                let Some(event) = primary_pointer(event) else {
                    return;
                };
                event.prevent_default();
                // Keep receiving moves when the pointer leaves the window
                let _ = target.set_pointer_capture(event.pointer_id());
                let (x, y) = client_point(event);
                dispatch(&weak, |overlay| overlay.pointer_down(x, y));
            },
        ));

        let weak = app.clone();
        listeners.push(EventListener::new(&root, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let (x, y) = client_point(event);
            dispatch(&weak, |overlay| overlay.pointer_move(x, y));
        }));

        for name in ["pointerup", "pointercancel"] {
            let weak = app.clone();
            listeners.push(EventListener::new(&root, name, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                let (x, y) = client_point(event);
                dispatch(&weak, |overlay| overlay.pointer_up(x, y));
            }));
        }

        // Capture phase so the page's own shortcuts don't see Escape/Enter
        let weak = app.clone();
        listeners.push(EventListener::new_with_options(
            window,
            "keydown",
            EventListenerOptions {
                phase: EventListenerPhase::Capture,
                passive: false,
            },
            move |event| {
                let Some(key) = event
                    .dyn_ref::<KeyboardEvent>()
                    .and_then(|e| OverlayKey::from_key(&e.key()))
                else {
                    return;
                };
                event.prevent_default();
                event.stop_propagation();
                dispatch(&weak, |overlay| overlay.key_down(key));
            },
        ));

        let weak = app.clone();
        let scrolled = window.clone();
        listeners.push(EventListener::new(window, "scroll", move |_| {
            let x = scrolled.scroll_x().unwrap_or(0.0);
            let y = scrolled.scroll_y().unwrap_or(0.0);
            dispatch(&weak, |overlay| overlay.on_scroll(x, y));
        }));

        // Toolbar buttons must not start a new selection underneath
        for button in [view.capture_button(), view.cancel_button()] {
            for name in ["pointerdown", "pointerup"] {
                listeners.push(EventListener::new(button, name, |event| {
                    event.stop_propagation();
                }));
            }
        }

        let weak = app.clone();
        listeners.push(EventListener::new(view.capture_button(), "click", move |_| {
            dispatch(&weak, |overlay| overlay.capture_clicked());
        }));

        let weak = app.clone();
        listeners.push(EventListener::new(view.cancel_button(), "click", move |_| {
            dispatch(&weak, |overlay| overlay.cancel());
        }));

        log::debug!("[OVERLAY] {} listeners installed", listeners.len());
        Self {
            _listeners: listeners,
        }
    }
}

// ----------------------------------------------------------------------
// Sidebar panel
// ----------------------------------------------------------------------

pub struct SidebarListeners {
    _listeners: Vec<EventListener>,
}

impl SidebarListeners {
    pub fn install(app: &WeakApp, view: &SidebarView) -> Self {
        let mut listeners = Vec::new();

        // One delegated click handler for every `data-action` element
        let weak = app.clone();
        listeners.push(EventListener::new(view.panel(), "click", move |event| {
            let Some(action) = clicked_action(event) else {
                return;
            };
            if let Some(app) = weak.upgrade() {
                app::panel_action(&app, action);
            }
        }));

        Self::install_header_drag(app, view.header(), &mut listeners);
        Self::install_resize(app, view.resize_grip(), &mut listeners);

        Self {
            _listeners: listeners,
        }
    }

    /// Dragging the header moves the panel and picks the side.
    fn install_header_drag(app: &WeakApp, header: &HtmlElement, listeners: &mut Vec<EventListener>) {
        let weak = app.clone();
        let target = header.clone();
        listeners.push(EventListener::new_with_options(
            header,
            "pointerdown",
            active(),
            move |event| {
                let Some(pointer) = primary_pointer(event) else {
                    return;
                };
                if is_on_button(event) {
                    return;
                }
                let Some(app) = weak.upgrade() else {
                    return;
                };
                pointer.prevent_default();
                let _ = target.set_pointer_capture(pointer.pointer_id());
                app.borrow_mut()
                    .sidebar_mut()
                    .begin_header_drag(pointer.client_y() as f64);
            },
        ));

        let weak = app.clone();
        listeners.push(EventListener::new(header, "pointermove", move |event| {
            let (Some(pointer), Some(app)) = (event.dyn_ref::<PointerEvent>(), weak.upgrade()) else {
                return;
            };
            let (x, y) = client_point(pointer);
            let mut inner = app.borrow_mut();
            if inner.sidebar_mut().drag_header(x, y) {
                inner.paint_sidebar();
            }
        }));

        for name in ["pointerup", "pointercancel"] {
            let weak = app.clone();
            listeners.push(EventListener::new(header, name, move |_| {
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().sidebar_mut().end_header_drag();
                }
            }));
        }
    }

    /// The grip along the bottom edge resizes the panel's height.
    fn install_resize(app: &WeakApp, grip: &HtmlElement, listeners: &mut Vec<EventListener>) {
        let resizing = Rc::new(Cell::new(false));

        let active_flag = Rc::clone(&resizing);
        let target = grip.clone();
        listeners.push(EventListener::new_with_options(
            grip,
            "pointerdown",
            active(),
            move |event| {
                let Some(pointer) = primary_pointer(event) else {
                    return;
                };
                pointer.prevent_default();
                let _ = target.set_pointer_capture(pointer.pointer_id());
                active_flag.set(true);
            },
        ));

        let weak = app.clone();
        let active_flag = Rc::clone(&resizing);
        listeners.push(EventListener::new(grip, "pointermove", move |event| {
            if !active_flag.get() {
                return;
            }
            let (Some(pointer), Some(app)) = (event.dyn_ref::<PointerEvent>(), weak.upgrade()) else {
                return;
            };
            let mut inner = app.borrow_mut();
            let top = inner.sidebar().state().position.y;
            inner
                .sidebar_mut()
                .resize_height(pointer.client_y() as f64 - top);
            inner.paint_sidebar();
        }));

        for name in ["pointerup", "pointercancel"] {
            let active_flag = Rc::clone(&resizing);
            listeners.push(EventListener::new(grip, name, move |_| {
                active_flag.set(false);
            }));
        }
    }
}

fn clicked_action(event: &Event) -> Option<PanelAction> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let el = target.closest("[data-action]").ok()??;
    let action = el.get_attribute("data-action")?;
    let id = el.get_attribute("data-id");
    PanelAction::parse(&action, id.as_deref())
}

fn is_on_button(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("button").ok().flatten())
        .is_some()
}

// ----------------------------------------------------------------------
// Window
// ----------------------------------------------------------------------

pub struct WindowListeners {
    _listeners: Vec<EventListener>,
    _pending_resize: Rc<RefCell<Option<Timeout>>>,
}

impl WindowListeners {
    pub fn install(app: &WeakApp, window: &Window) -> Self {
        let mut listeners = Vec::new();
        let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

        let weak = app.clone();
        let timer = Rc::clone(&pending);
        listeners.push(EventListener::new(window, "resize", move |_| {
            let weak = weak.clone();
            // Replacing the handle cancels the previous timeout
            *timer.borrow_mut() = Some(Timeout::new(RESIZE_DEBOUNCE_MS, move || {
                if let Some(app) = weak.upgrade() {
                    app::on_window_resize(&app);
                }
            }));
        }));

        let weak = app.clone();
        listeners.push(EventListener::new(window, "pagehide", move |_| {
            if let Some(app) = weak.upgrade() {
                app::close(&app);
            }
        }));

        Self {
            _listeners: listeners,
            _pending_resize: pending,
        }
    }
}
