//! Bridge to the extension's background worker.
//!
//! Content scripts can't call `chrome.tabs.captureVisibleTab` themselves;
//! they ask the background worker through `chrome.runtime.sendMessage` and
//! get a PNG data URL back. Downloads and clipboard writes go the same way.

use std::cell::Cell;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo::timers::future::TimeoutFuture;
use image::RgbaImage;
use js_sys::{Function, Promise, Reflect};
use pagesnap::capture::{decode_data_url, DocumentSize, TabCapture};
use pagesnap::capture_overlay::Viewport;
use pagesnap::{PageSnapError, PageSnapResult};
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

/// Wait after scrolling so the new position is painted before capturing
const SCROLL_SETTLE_MS: u32 = 120;

/// `captureVisibleTab` is rate limited to two calls per second
const MIN_CAPTURE_INTERVAL_MS: f64 = 550.0;

/// Messages understood by the background worker.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum BackgroundMessage<'a> {
    #[serde(rename = "pagesnap:capture-visible")]
    CaptureVisible,
    #[serde(rename = "pagesnap:download", rename_all = "camelCase")]
    Download { data_url: &'a str, filename: &'a str },
    #[serde(rename = "pagesnap:copy", rename_all = "camelCase")]
    Copy { data_url: &'a str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CaptureResponse {
    data_url: Option<String>,
    error: Option<String>,
}

/// Send a message and wait for the worker's response.
pub async fn send_message(message: &BackgroundMessage<'_>) -> PageSnapResult<JsValue> {
    let payload = serde_wasm_bindgen::to_value(message)
        .map_err(|e| PageSnapError::Other(format!("serialize message: {}", e)))?;
    send_payload(payload).await
}

/// Fire and forget; failures are only logged.
pub fn post_message(message: BackgroundMessage<'_>) {
    let payload = match serde_wasm_bindgen::to_value(&message) {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("[CAPTURE] Failed to serialize {:?}: {}", message, e);
            return;
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = send_payload(payload).await {
            log::warn!("[CAPTURE] Background message failed: {}", e);
        }
    });
}

async fn send_payload(payload: JsValue) -> PageSnapResult<JsValue> {
    let runtime = Reflect::get(&js_sys::global(), &JsValue::from_str("chrome"))
        .and_then(|chrome| Reflect::get(&chrome, &JsValue::from_str("runtime")))
        .map_err(|e| capture_error("chrome.runtime", e))?;
    let send: Function = Reflect::get(&runtime, &JsValue::from_str("sendMessage"))
        .map_err(|e| capture_error("chrome.runtime.sendMessage", e))?
        .dyn_into()
        .map_err(|_| PageSnapError::Capture("extension messaging is unavailable".to_string()))?;
    let promise: Promise = send
        .call1(&runtime, &payload)
        .map_err(|e| capture_error("sendMessage", e))?
        .dyn_into()
        .map_err(|_| PageSnapError::Capture("sendMessage did not return a promise".to_string()))?;
    JsFuture::from(promise)
        .await
        .map_err(|e| capture_error("background worker", e))
}

fn capture_error(context: &str, err: JsValue) -> PageSnapError {
    let detail = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    PageSnapError::Capture(format!("{}: {}", context, detail))
}

/// Current scroll offset and size of the window.
pub fn read_viewport(window: &Window) -> Viewport {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Viewport {
        scroll_x: window.scroll_x().unwrap_or(0.0),
        scroll_y: window.scroll_y().unwrap_or(0.0),
        width,
        height,
        device_pixel_ratio: window.device_pixel_ratio(),
    }
}

/// Scrollable size of the document.
pub fn read_document_size(window: &Window) -> Option<DocumentSize> {
    let root = window.document()?.document_element()?;
    Some(DocumentSize::new(
        root.scroll_width() as f64,
        root.scroll_height() as f64,
    ))
}

pub fn now_ms(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// The current tab, captured through the background worker.
pub struct ChromeTab {
    window: Window,
    last_capture: Cell<Option<f64>>,
}

impl ChromeTab {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            last_capture: Cell::new(None),
        }
    }

    async fn respect_rate_limit(&self) {
        if let Some(last) = self.last_capture.get() {
            let elapsed = now_ms(&self.window) - last;
            if elapsed < MIN_CAPTURE_INTERVAL_MS {
                TimeoutFuture::new((MIN_CAPTURE_INTERVAL_MS - elapsed).ceil() as u32).await;
            }
        }
    }

    async fn capture(&self) -> PageSnapResult<RgbaImage> {
        self.respect_rate_limit().await;
        let response = send_message(&BackgroundMessage::CaptureVisible).await;
        self.last_capture.set(Some(now_ms(&self.window)));

        let response: CaptureResponse = serde_wasm_bindgen::from_value(response?)
            .map_err(|e| PageSnapError::Capture(format!("unexpected response: {}", e)))?;
        match (response.data_url, response.error) {
            (Some(data_url), _) => decode_data_url(&data_url),
            (None, Some(error)) => Err(PageSnapError::Capture(error)),
            (None, None) => Err(PageSnapError::Capture("empty response".to_string())),
        }
    }
}

impl TabCapture for ChromeTab {
    fn viewport(&self) -> Viewport {
        read_viewport(&self.window)
    }

    fn capture_visible(&self) -> LocalBoxFuture<'_, PageSnapResult<RgbaImage>> {
        self.capture().boxed_local()
    }

    fn scroll_to(&self, x: f64, y: f64) -> LocalBoxFuture<'_, PageSnapResult<()>> {
        async move {
            self.window.scroll_to_with_x_and_y(x, y);
            TimeoutFuture::new(SCROLL_SETTLE_MS).await;
            Ok(())
        }
        .boxed_local()
    }
}
