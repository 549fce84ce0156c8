//! Retained-mode painter for the capture overlay.
//!
//! All elements are created once when the overlay mounts; each frame only
//! updates their geometry, text and visibility.

use pagesnap::capture_overlay::{HandleKey, OverlayFrame, Viewport, ViewportRect, HANDLE_SIZE};
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use crate::dom_portal::{append_stylesheet, create_element, set_px, set_shown};

/// Room needed below the selection for the toolbar
const TOOLBAR_HEIGHT: f64 = 36.0;
const TOOLBAR_GAP: f64 = 8.0;

const OVERLAY_CSS: &str = r#"
#pagesnap-capture-overlay * { box-sizing: border-box; font: 13px/1.4 system-ui, -apple-system, "Segoe UI", sans-serif; }
#pagesnap-capture-overlay .ps-mask { position: absolute; background: rgba(0, 0, 0, 0.45); }
#pagesnap-capture-overlay .ps-selection { position: absolute; border: 2px solid #3b82f6; box-shadow: 0 0 0 1px rgba(255, 255, 255, 0.6); }
#pagesnap-capture-overlay .ps-handle { position: absolute; background: #fff; border: 2px solid #3b82f6; border-radius: 2px; }
#pagesnap-capture-overlay .ps-size { position: absolute; height: 22px; padding: 2px 8px; border-radius: 4px; background: rgba(17, 24, 39, 0.85); color: #fff; white-space: nowrap; }
#pagesnap-capture-overlay .ps-hint { position: absolute; top: 16px; left: 50%; transform: translateX(-50%); padding: 8px 14px; border-radius: 6px; background: rgba(17, 24, 39, 0.85); color: #fff; }
#pagesnap-capture-overlay .ps-warning { position: absolute; bottom: 16px; left: 50%; transform: translateX(-50%); padding: 8px 14px; border-radius: 6px; background: #fef3c7; color: #92400e; }
#pagesnap-capture-overlay .ps-toolbar { position: absolute; display: flex; gap: 6px; transform: translateX(-100%); }
#pagesnap-capture-overlay .ps-toolbar button { cursor: pointer; padding: 6px 12px; border: none; border-radius: 6px; background: #fff; color: #111827; }
#pagesnap-capture-overlay .ps-toolbar button[data-action="capture"] { background: #3b82f6; color: #fff; }
"#;

pub struct OverlayView {
    root: HtmlElement,
    mask: Vec<HtmlElement>,
    selection: HtmlElement,
    handles: Vec<(HandleKey, HtmlElement)>,
    size_label: HtmlElement,
    hint: HtmlElement,
    warning: HtmlElement,
    toolbar: HtmlElement,
    capture_button: HtmlElement,
    cancel_button: HtmlElement,
}

impl OverlayView {
    pub fn build(document: &Document, root: &HtmlElement) -> Result<Self, JsValue> {
        append_stylesheet(document, root, OVERLAY_CSS)?;

        let mut mask = Vec::with_capacity(4);
        for _ in 0..4 {
            let segment = create_element(document, "div", "ps-mask")?;
            root.append_child(&segment)?;
            mask.push(segment);
        }

        let selection = create_element(document, "div", "ps-selection")?;
        root.append_child(&selection)?;

        let mut handles = Vec::with_capacity(HandleKey::ALL.len());
        for key in HandleKey::ALL {
            let handle = create_element(document, "div", "ps-handle")?;
            handle.set_attribute("data-handle", key.as_str())?;
            set_px(&handle, &[("width", HANDLE_SIZE), ("height", HANDLE_SIZE)])?;
            root.append_child(&handle)?;
            handles.push((key, handle));
        }

        let size_label = create_element(document, "div", "ps-size")?;
        root.append_child(&size_label)?;

        let hint = create_element(document, "div", "ps-hint")?;
        hint.set_text_content(Some("Drag to select an area. Press Esc to cancel."));
        root.append_child(&hint)?;

        let warning = create_element(document, "div", "ps-warning")?;
        warning.set_text_content(Some(
            "Only the part of the selection inside the window will be captured.",
        ));
        root.append_child(&warning)?;

        let toolbar = create_element(document, "div", "ps-toolbar")?;
        let cancel_button = create_element(document, "button", "")?;
        cancel_button.set_attribute("data-action", "cancel")?;
        cancel_button.set_text_content(Some("Cancel"));
        let capture_button = create_element(document, "button", "")?;
        capture_button.set_attribute("data-action", "capture")?;
        capture_button.set_text_content(Some("Capture"));
        toolbar.append_child(&cancel_button)?;
        toolbar.append_child(&capture_button)?;
        root.append_child(&toolbar)?;

        Ok(Self {
            root: root.clone(),
            mask,
            selection,
            handles,
            size_label,
            hint,
            warning,
            toolbar,
            capture_button,
            cancel_button,
        })
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn capture_button(&self) -> &HtmlElement {
        &self.capture_button
    }

    pub fn cancel_button(&self) -> &HtmlElement {
        &self.cancel_button
    }

    pub fn paint(&self, frame: &OverlayFrame, viewport: &Viewport) -> Result<(), JsValue> {
        let root_style = self.root.style();
        if !frame.visible {
            // Keep the nodes; the capture may fail and bring them back
            root_style.set_property("visibility", "hidden")?;
            root_style.set_property("pointer-events", "none")?;
            return Ok(());
        }
        root_style.set_property("visibility", "visible")?;
        root_style.set_property("pointer-events", "auto")?;
        root_style.set_property("cursor", frame.cursor.as_css())?;

        for (i, segment) in self.mask.iter().enumerate() {
            match frame.mask.get(i) {
                Some(rect) => place(segment, rect)?,
                None => set_shown(segment, false)?,
            }
        }

        match &frame.selection {
            Some(rect) => place(&self.selection, rect)?,
            None => set_shown(&self.selection, false)?,
        }

        for (key, el) in &self.handles {
            match frame.handles.iter().find(|h| h.key == *key) {
                Some(handle) => {
                    set_px(
                        el,
                        &[
                            ("left", handle.x - HANDLE_SIZE / 2.0),
                            ("top", handle.y - HANDLE_SIZE / 2.0),
                        ],
                    )?;
                    el.style().set_property("cursor", handle.cursor.as_css())?;
                    set_shown(el, true)?;
                }
                None => set_shown(el, false)?,
            }
        }

        match &frame.size_label {
            Some(label) => {
                self.size_label.set_text_content(Some(&label.text));
                set_px(&self.size_label, &[("left", label.left), ("top", label.top)])?;
                set_shown(&self.size_label, true)?;
            }
            None => set_shown(&self.size_label, false)?,
        }

        set_shown(&self.hint, frame.show_instructions)?;
        set_shown(&self.warning, frame.clipped_warning)?;

        match (&frame.selection, frame.show_capture_button) {
            (Some(rect), true) => {
                let (left, top) = toolbar_position(rect, viewport);
                set_px(&self.toolbar, &[("left", left), ("top", top)])?;
                set_shown(&self.toolbar, true)?;
            }
            _ => set_shown(&self.toolbar, false)?,
        }

        Ok(())
    }
}

fn place(el: &HtmlElement, rect: &ViewportRect) -> Result<(), JsValue> {
    set_px(
        el,
        &[
            ("left", rect.left),
            ("top", rect.top),
            ("width", rect.width.max(0.0)),
            ("height", rect.height.max(0.0)),
        ],
    )?;
    set_shown(el, true)
}

/// Right-aligned under the selection, inside its bottom edge when the
/// window has no room below, and never off screen.
fn toolbar_position(rect: &ViewportRect, viewport: &Viewport) -> (f64, f64) {
    let below = rect.bottom() + TOOLBAR_GAP;
    let top = if below + TOOLBAR_HEIGHT <= viewport.height {
        below
    } else {
        rect.bottom() - TOOLBAR_HEIGHT - TOOLBAR_GAP
    };
    let max_top = (viewport.height - TOOLBAR_HEIGHT - TOOLBAR_GAP).max(0.0);
    let left = rect.right().clamp(TOOLBAR_GAP, viewport.width.max(TOOLBAR_GAP));
    (left, top.clamp(TOOLBAR_GAP.min(max_top), max_top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_below_selection_when_room() {
        let vp = Viewport::new(1000.0, 800.0);
        let rect = ViewportRect::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(toolbar_position(&rect, &vp), (300.0, 208.0));
    }

    #[test]
    fn toolbar_moves_inside_at_bottom_edge() {
        let vp = Viewport::new(1000.0, 800.0);
        let rect = ViewportRect::new(100.0, 600.0, 200.0, 190.0);
        let (_, top) = toolbar_position(&rect, &vp);
        assert_eq!(top, 790.0 - TOOLBAR_HEIGHT - TOOLBAR_GAP);
    }

    #[test]
    fn toolbar_stays_on_screen() {
        let vp = Viewport::new(1000.0, 800.0);
        let rect = ViewportRect::new(900.0, -300.0, 400.0, 200.0);
        let (left, top) = toolbar_position(&rect, &vp);
        assert_eq!(left, 1000.0);
        assert_eq!(top, TOOLBAR_GAP);
    }
}
