//! Sidebar panel painter.
//!
//! Geometry is updated on every frame (the slide animation runs through
//! here). The gallery and notice lists are rebuilt only when their ids
//! change, since thumbnails carry whole data URLs.

use pagesnap::config::Theme;
use pagesnap::sidebar::{CaptureEntry, Notice, SidebarFrame};
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use crate::dom_portal::{append_stylesheet, create_element, set_px, set_shown};

/// What a click on a `data-action` element of the panel asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    ToggleCollapsed,
    SwitchSide,
    Close,
    CaptureArea,
    CaptureVisible,
    CaptureFullPage,
    ClearGallery,
    Download(String),
    Copy(String),
    Remove(String),
    Dismiss(u64),
}

impl PanelAction {
    /// From an element's `data-action` and `data-id` attributes.
    pub fn parse(action: &str, id: Option<&str>) -> Option<Self> {
        let action = match (action, id) {
            ("collapse", _) => Self::ToggleCollapsed,
            ("side", _) => Self::SwitchSide,
            ("close", _) => Self::Close,
            ("area", _) => Self::CaptureArea,
            ("viewport", _) => Self::CaptureVisible,
            ("full-page", _) => Self::CaptureFullPage,
            ("clear", _) => Self::ClearGallery,
            ("download", Some(id)) => Self::Download(id.to_string()),
            ("copy", Some(id)) => Self::Copy(id.to_string()),
            ("remove", Some(id)) => Self::Remove(id.to_string()),
            ("dismiss", Some(id)) => Self::Dismiss(id.parse().ok()?),
            _ => return None,
        };
        Some(action)
    }
}

const SIDEBAR_CSS: &str = r#"
#pagesnap-sidebar * { box-sizing: border-box; font: 13px/1.4 system-ui, -apple-system, "Segoe UI", sans-serif; }
#pagesnap-sidebar .ps-panel {
  --ps-bg: #ffffff; --ps-fg: #1f2328; --ps-muted: #656d76; --ps-border: #d0d7de; --ps-accent: #3b82f6;
  position: absolute; display: flex; flex-direction: column; overflow: hidden; pointer-events: auto;
  background: var(--ps-bg); color: var(--ps-fg); border: 1px solid var(--ps-border); border-radius: 10px;
  box-shadow: 0 8px 24px rgba(0, 0, 0, 0.18); will-change: transform;
}
#pagesnap-sidebar .ps-panel[data-theme="dark"] { --ps-bg: #1f2328; --ps-fg: #e6edf3; --ps-muted: #8d96a0; --ps-border: #30363d; }
@media (prefers-color-scheme: dark) {
  #pagesnap-sidebar .ps-panel[data-theme="system"] { --ps-bg: #1f2328; --ps-fg: #e6edf3; --ps-muted: #8d96a0; --ps-border: #30363d; }
}
#pagesnap-sidebar .ps-header { display: flex; align-items: center; gap: 4px; padding: 8px; cursor: grab; user-select: none; border-bottom: 1px solid var(--ps-border); touch-action: none; }
#pagesnap-sidebar .ps-title { flex: 1; font-weight: 600; }
#pagesnap-sidebar button { cursor: pointer; border: 1px solid var(--ps-border); border-radius: 6px; background: transparent; color: inherit; padding: 4px 8px; }
#pagesnap-sidebar button[data-active="true"] { background: var(--ps-accent); color: #fff; border-color: var(--ps-accent); }
#pagesnap-sidebar .ps-actions { display: flex; gap: 6px; padding: 8px; flex-wrap: wrap; }
#pagesnap-sidebar .ps-notices { display: flex; flex-direction: column; gap: 4px; padding: 0 8px; }
#pagesnap-sidebar .ps-notice { padding: 6px 8px; border-radius: 6px; cursor: pointer; background: #e0f2fe; color: #075985; }
#pagesnap-sidebar .ps-notice[data-level="success"] { background: #dcfce7; color: #166534; }
#pagesnap-sidebar .ps-notice[data-level="error"] { background: #fee2e2; color: #991b1b; }
#pagesnap-sidebar .ps-gallery { flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 8px; padding: 8px; }
#pagesnap-sidebar .ps-empty { color: var(--ps-muted); text-align: center; padding: 16px 0; }
#pagesnap-sidebar .ps-item img { display: block; width: 100%; max-height: 180px; object-fit: contain; border: 1px solid var(--ps-border); border-radius: 6px; background: repeating-conic-gradient(#eee 0% 25%, #fff 0% 50%) 50% / 16px 16px; }
#pagesnap-sidebar .ps-item-meta { display: flex; align-items: center; gap: 4px; padding-top: 4px; color: var(--ps-muted); }
#pagesnap-sidebar .ps-item-meta span { flex: 1; }
#pagesnap-sidebar .ps-resize { height: 8px; cursor: ns-resize; touch-action: none; }
#pagesnap-sidebar .ps-panel[data-collapsed="true"] .ps-title,
#pagesnap-sidebar .ps-panel[data-collapsed="true"] .ps-actions,
#pagesnap-sidebar .ps-panel[data-collapsed="true"] .ps-notices,
#pagesnap-sidebar .ps-panel[data-collapsed="true"] .ps-gallery,
#pagesnap-sidebar .ps-panel[data-collapsed="true"] button[data-action="side"] { display: none; }
#pagesnap-sidebar .ps-panel[data-collapsed="true"] .ps-header { flex-direction: column; border-bottom: none; flex: 1; }
"#;

pub struct SidebarView {
    root: HtmlElement,
    document: Document,
    panel: HtmlElement,
    header: HtmlElement,
    resize_grip: HtmlElement,
    collapse_button: HtmlElement,
    area_button: HtmlElement,
    notices: HtmlElement,
    gallery: HtmlElement,
    rendered_notices: Vec<u64>,
    rendered_entries: Vec<String>,
}

impl SidebarView {
    pub fn build(document: &Document, root: &HtmlElement) -> Result<Self, JsValue> {
        append_stylesheet(document, root, SIDEBAR_CSS)?;

        let panel = create_element(document, "div", "ps-panel")?;
        root.append_child(&panel)?;

        let header = create_element(document, "div", "ps-header")?;
        let title = create_element(document, "span", "ps-title")?;
        title.set_text_content(Some("PageSnap"));
        header.append_child(&title)?;
        let collapse_button = action_button(document, "collapse", "\u{2212}", "Collapse")?;
        header.append_child(&collapse_button)?;
        header.append_child(&action_button(document, "side", "\u{21c4}", "Move to other side")?)?;
        header.append_child(&action_button(document, "close", "\u{00d7}", "Close")?)?;
        panel.append_child(&header)?;

        let actions = create_element(document, "div", "ps-actions")?;
        let area_button = action_button(document, "area", "Select area", "Capture a selected area")?;
        actions.append_child(&area_button)?;
        actions.append_child(&action_button(document, "viewport", "Visible", "Capture the visible page")?)?;
        actions.append_child(&action_button(document, "full-page", "Full page", "Capture the whole page")?)?;
        actions.append_child(&action_button(document, "clear", "Clear", "Remove all captures")?)?;
        panel.append_child(&actions)?;

        let notices = create_element(document, "div", "ps-notices")?;
        panel.append_child(&notices)?;

        let gallery = create_element(document, "div", "ps-gallery")?;
        panel.append_child(&gallery)?;

        let resize_grip = create_element(document, "div", "ps-resize")?;
        panel.append_child(&resize_grip)?;

        let mut view = Self {
            root: root.clone(),
            document: document.clone(),
            panel,
            header,
            resize_grip,
            collapse_button,
            area_button,
            notices,
            gallery,
            rendered_notices: Vec::new(),
            rendered_entries: Vec::new(),
        };
        view.render_gallery(&[])?;
        Ok(view)
    }

    pub fn root(&self) -> &HtmlElement {
        &self.root
    }

    pub fn panel(&self) -> &HtmlElement {
        &self.panel
    }

    pub fn header(&self) -> &HtmlElement {
        &self.header
    }

    pub fn resize_grip(&self) -> &HtmlElement {
        &self.resize_grip
    }

    pub fn paint(&mut self, frame: &SidebarFrame, theme: Theme) -> Result<(), JsValue> {
        set_shown(&self.panel, frame.visible)?;
        if !frame.visible {
            return Ok(());
        }

        set_px(
            &self.panel,
            &[
                ("left", frame.left),
                ("top", frame.top),
                ("width", frame.width),
                ("height", frame.height),
            ],
        )?;
        self.panel
            .style()
            .set_property("transform", &format!("translateX({}px)", frame.offset_x))?;
        self.panel.set_attribute("data-theme", theme.as_str())?;
        self.panel.set_attribute("data-side", frame.side.as_str())?;
        self.panel
            .set_attribute("data-collapsed", if frame.collapsed { "true" } else { "false" })?;
        self.collapse_button
            .set_text_content(Some(if frame.collapsed { "+" } else { "\u{2212}" }));
        self.area_button
            .set_attribute("data-active", if frame.selecting { "true" } else { "false" })?;

        if frame.notices.iter().map(|n| n.id).ne(self.rendered_notices.iter().copied()) {
            self.render_notices(&frame.notices)?;
        }
        if frame
            .entries
            .iter()
            .map(|e| e.id.as_str())
            .ne(self.rendered_entries.iter().map(String::as_str))
        {
            self.render_gallery(&frame.entries)?;
        }
        Ok(())
    }

    fn render_notices(&mut self, notices: &[Notice]) -> Result<(), JsValue> {
        self.notices.set_inner_html("");
        for notice in notices {
            let el = create_element(&self.document, "div", "ps-notice")?;
            el.set_attribute("data-action", "dismiss")?;
            el.set_attribute("data-id", &notice.id.to_string())?;
            el.set_attribute("data-level", level_name(notice))?;
            el.set_text_content(Some(&notice.message));
            self.notices.append_child(&el)?;
        }
        self.rendered_notices = notices.iter().map(|n| n.id).collect();
        Ok(())
    }

    fn render_gallery(&mut self, entries: &[CaptureEntry]) -> Result<(), JsValue> {
        self.gallery.set_inner_html("");
        if entries.is_empty() {
            let empty = create_element(&self.document, "div", "ps-empty")?;
            empty.set_text_content(Some("No captures yet"));
            self.gallery.append_child(&empty)?;
        }
        for entry in entries {
            let item = create_element(&self.document, "div", "ps-item")?;
            item.set_attribute("data-id", &entry.id)?;

            let img = create_element(&self.document, "img", "")?;
            img.set_attribute("src", &entry.data_url)?;
            img.set_attribute("alt", &format!("Capture {} \u{00d7} {}", entry.width, entry.height))?;
            item.append_child(&img)?;

            let meta = create_element(&self.document, "div", "ps-item-meta")?;
            let size = create_element(&self.document, "span", "")?;
            size.set_text_content(Some(&format!("{} \u{00d7} {}", entry.width, entry.height)));
            meta.append_child(&size)?;
            for (action, label, title) in [
                ("download", "Save", "Download"),
                ("copy", "Copy", "Copy to clipboard"),
                ("remove", "\u{00d7}", "Remove"),
            ] {
                let button = action_button(&self.document, action, label, title)?;
                button.set_attribute("data-id", &entry.id)?;
                meta.append_child(&button)?;
            }
            item.append_child(&meta)?;
            self.gallery.append_child(&item)?;
        }
        self.rendered_entries = entries.iter().map(|e| e.id.clone()).collect();
        Ok(())
    }
}

fn action_button(document: &Document, action: &str, label: &str, title: &str) -> Result<HtmlElement, JsValue> {
    let button = create_element(document, "button", "")?;
    button.set_attribute("type", "button")?;
    button.set_attribute("data-action", action)?;
    button.set_title(title);
    button.set_text_content(Some(label));
    Ok(button)
}

fn level_name(notice: &Notice) -> &'static str {
    use pagesnap::sidebar::NoticeLevel;
    match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "success",
        NoticeLevel::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_panel_buttons() {
        assert_eq!(PanelAction::parse("area", None), Some(PanelAction::CaptureArea));
        assert_eq!(PanelAction::parse("full-page", None), Some(PanelAction::CaptureFullPage));
        assert_eq!(PanelAction::parse("side", Some("ignored")), Some(PanelAction::SwitchSide));
    }

    #[test]
    fn item_actions_need_an_id() {
        assert_eq!(
            PanelAction::parse("remove", Some("abc")),
            Some(PanelAction::Remove("abc".to_string()))
        );
        assert_eq!(PanelAction::parse("download", None), None);
        assert_eq!(PanelAction::parse("dismiss", Some("7")), Some(PanelAction::Dismiss(7)));
        assert_eq!(PanelAction::parse("dismiss", Some("x")), None);
        assert_eq!(PanelAction::parse("explode", None), None);
    }
}
