//! PageSnap content script.
//!
//! Binds the capture core to a live page: the portals are real `<div>`s on
//! `document.body`, frames are painted into retained elements, DOM events
//! drive the overlay and sidebar, and screenshots come from the background
//! worker.
//!
//! ```text
//! JS glue ──> ContentScript ──> app (Rc<RefCell<App>>)
//!                                 ├── SidebarHost<DomHost>   (pagesnap core)
//!                                 ├── OverlayView / SidebarView (painters)
//!                                 ├── listeners (gloo, per mount)
//!                                 └── ChromeTab ──sendMessage──> background
//! ```

mod app;
mod chrome_capture;
mod dom_portal;
mod listeners;
mod overlay_view;
mod sidebar_view;

use js_sys::Promise;
use pagesnap::capture::CaptureMode;
use pagesnap::config::{ExtensionSettings, SettingsHandle};
use pagesnap::PageSnapError;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::app::SharedApp;

/// Initialize panic hook and logging
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("[PageSnap] Content script module initialized");
}

/// Errors reach JS as their message.
fn to_js(err: PageSnapError) -> JsValue {
    serde_wasm_bindgen::to_value(&err).unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
}

/// Stored settings arrive as the raw JSON blob or as an already parsed
/// object; anything unreadable means defaults.
fn parse_settings(value: &JsValue) -> ExtensionSettings {
    if let Some(raw) = value.as_string() {
        return ExtensionSettings::from_json(&raw);
    }
    if value.is_undefined() || value.is_null() {
        return ExtensionSettings::default();
    }
    match serde_wasm_bindgen::from_value::<ExtensionSettings>(value.clone()) {
        Ok(mut settings) => {
            settings.validate();
            settings
        }
        Err(e) => {
            log::warn!("[SETTINGS] {}, using defaults", e);
            ExtensionSettings::default()
        }
    }
}

/// One per page, created by the JS glue on injection.
#[wasm_bindgen]
pub struct ContentScript {
    app: SharedApp,
}

#[wasm_bindgen]
impl ContentScript {
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<ContentScript, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let settings = SettingsHandle::new(parse_settings(&settings));
        let app = app::App::create(window, settings).map_err(to_js)?;
        Ok(ContentScript { app })
    }

    /// Slide the sidebar in. False when the page refused the panel.
    pub fn show(&self) -> bool {
        app::show(&self.app)
    }

    pub fn hide(&self) {
        app::hide(&self.app)
    }

    /// "Open sidebar" signal from the toolbar button.
    pub fn toggle(&self) {
        app::toggle(&self.app)
    }

    /// Remove the sidebar and any overlay immediately.
    pub fn close(&self) {
        app::close(&self.app)
    }

    #[wasm_bindgen(js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.app.borrow().sidebar().state().visible
    }

    /// Open the selection overlay.
    #[wasm_bindgen(js_name = startAreaCapture)]
    pub fn start_area_capture(&self) -> bool {
        app::start_area_capture(&self.app)
    }

    /// Capture the visible page. Resolves with the new capture's id.
    #[wasm_bindgen(js_name = captureVisible)]
    pub fn capture_visible(&self) -> Promise {
        self.capture(CaptureMode::Viewport)
    }

    /// Capture the whole scrollable page. Resolves with the new capture's id.
    #[wasm_bindgen(js_name = captureFullPage)]
    pub fn capture_full_page(&self) -> Promise {
        self.capture(CaptureMode::FullPage)
    }

    /// Storage changed: replace the settings wholesale.
    #[wasm_bindgen(js_name = updateSettings)]
    pub fn update_settings(&self, settings: JsValue) {
        app::update_settings(&self.app, parse_settings(&settings));
    }

    /// Gallery entries, newest first.
    pub fn captures(&self) -> Result<JsValue, JsValue> {
        let inner = self.app.borrow();
        let entries: Vec<_> = inner.sidebar().gallery().entries().collect();
        serde_wasm_bindgen::to_value(&entries).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = removeCapture)]
    pub fn remove_capture(&self, id: &str) -> bool {
        let removed = self
            .app
            .borrow_mut()
            .sidebar_mut()
            .gallery_mut()
            .remove(id)
            .is_some();
        if removed {
            app::refresh(&self.app);
        }
        removed
    }

    #[wasm_bindgen(js_name = clearCaptures)]
    pub fn clear_captures(&self) {
        self.app.borrow_mut().sidebar_mut().gallery_mut().clear();
        app::refresh(&self.app);
    }
}

impl ContentScript {
    fn capture(&self, mode: CaptureMode) -> Promise {
        let app = self.app.clone();
        future_to_promise(async move {
            match app::capture_page(app, mode).await {
                Ok(Some(id)) => Ok(JsValue::from_str(&id)),
                Ok(None) => Ok(JsValue::UNDEFINED),
                Err(e) => Err(to_js(e)),
            }
        })
    }
}

impl Drop for ContentScript {
    fn drop(&mut self) {
        app::close(&self.app);
    }
}
