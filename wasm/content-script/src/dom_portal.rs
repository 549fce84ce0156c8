//! `PortalHost` backed by the page's real document.

use pagesnap::capture_overlay::PortalHost;
use pagesnap::{PageSnapError, PageSnapResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

/// Every portal root: fixed over the whole viewport, above anything the
/// page stacks, transparent. Children opt back into pointer events.
const ROOT_STYLES: &[(&str, &str)] = &[
    ("all", "initial"),
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100vw"),
    ("height", "100vh"),
    ("margin", "0"),
    ("padding", "0"),
    ("border", "none"),
    ("background", "transparent"),
    ("z-index", "2147483647"),
    ("pointer-events", "none"),
];

#[derive(Clone)]
pub struct DomHost {
    document: Document,
}

impl DomHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl PortalHost for DomHost {
    type Node = HtmlElement;

    fn find_root(&self, id: &str) -> Option<HtmlElement> {
        self.document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn create_root(&mut self, id: &str) -> PageSnapResult<HtmlElement> {
        let body = self
            .document
            .body()
            .ok_or_else(|| PageSnapError::Portal("document has no body".to_string()))?;
        let root = create_element(&self.document, "div", "")
            .map_err(|e| js_error("create portal root", e))?;
        root.set_id(id);
        set_styles(&root, ROOT_STYLES).map_err(|e| js_error("style portal root", e))?;
        body.append_child(&root)
            .map_err(|e| js_error("append portal root", e))?;
        Ok(root)
    }

    fn remove_root(&mut self, node: &HtmlElement) -> PageSnapResult<()> {
        node.remove();
        Ok(())
    }
}

/// Wrap a DOM exception; pages can block DOM access in odd ways.
pub fn js_error(context: &str, err: JsValue) -> PageSnapError {
    let detail = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err));
    PageSnapError::Portal(format!("{}: {}", context, detail))
}

pub fn create_element(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = document.create_element(tag)?.dyn_into()?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

pub fn set_styles(el: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = el.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

/// Shown elements fall back to their stylesheet `display`.
pub fn set_shown(el: &HtmlElement, shown: bool) -> Result<(), JsValue> {
    let style = el.style();
    if shown {
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    }
}

/// Set pixel-valued properties (`left`, `width`, ...).
pub fn set_px(el: &HtmlElement, values: &[(&str, f64)]) -> Result<(), JsValue> {
    let style = el.style();
    for (name, value) in values {
        style.set_property(name, &format!("{}px", value))?;
    }
    Ok(())
}

/// Scoped stylesheet inside a portal root.
pub fn append_stylesheet(document: &Document, root: &HtmlElement, css: &str) -> Result<(), JsValue> {
    let style = document.create_element("style")?;
    style.set_text_content(Some(css));
    root.append_child(&style)?;
    Ok(())
}
