//! Tests for the sidebar host.
//!
//! - Show/hide lifecycle and animation timing
//! - Layout actions routed through the host
//! - Overlay event handling (thumbnails, notices)

#[cfg(test)]
mod lifecycle_tests {
    use chrono::Utc;

    use crate::capture_overlay::Viewport;
    use crate::config::SettingsHandle;
    use crate::sidebar::*;
    use crate::testing::MemoryHost;

    fn host() -> (SidebarHost<MemoryHost>, MemoryHost) {
        let dom = MemoryHost::default();
        let host = SidebarHost::new(dom.clone(), Viewport::new(1280.0, 800.0), SettingsHandle::default());
        (host, dom)
    }

    #[test]
    fn show_mounts_and_slides_in() {
        let (mut sidebar, dom) = host();
        assert!(sidebar.show(0.0));
        assert!(sidebar.state().visible);
        assert_eq!(dom.count(SIDEBAR_ROOT_ID), 1);

        let start = sidebar.frame(0.0);
        assert!(start.offset_x > 0.0);
        assert!(sidebar.tick(SLIDE_DURATION_MS, Utc::now()));
        assert!(!sidebar.is_animating());
        assert_eq!(sidebar.frame(SLIDE_DURATION_MS).offset_x, 0.0);
    }

    #[test]
    fn hidden_only_after_animation_finishes() {
        let (mut sidebar, dom) = host();
        sidebar.show(0.0);
        sidebar.tick(SLIDE_DURATION_MS, Utc::now());

        sidebar.hide(1000.0);
        sidebar.tick(1100.0, Utc::now());
        assert!(sidebar.state().visible);
        assert_eq!(dom.count(SIDEBAR_ROOT_ID), 1);

        sidebar.tick(1000.0 + SLIDE_DURATION_MS, Utc::now());
        assert!(!sidebar.state().visible);
        assert_eq!(dom.count(SIDEBAR_ROOT_ID), 0);
    }

    #[test]
    fn show_during_hide_reverses() {
        let (mut sidebar, dom) = host();
        sidebar.show(0.0);
        sidebar.tick(SLIDE_DURATION_MS, Utc::now());
        sidebar.hide(1000.0);
        sidebar.show(1100.0);
        sidebar.tick(1100.0 + SLIDE_DURATION_MS, Utc::now());
        assert!(sidebar.state().visible);
        assert_eq!(dom.count(SIDEBAR_ROOT_ID), 1);
    }

    #[test]
    fn toggle_alternates() {
        let (mut sidebar, _) = host();
        sidebar.toggle(0.0);
        sidebar.tick(SLIDE_DURATION_MS, Utc::now());
        assert!(sidebar.state().visible);
        sidebar.toggle(1000.0);
        sidebar.tick(1000.0 + SLIDE_DURATION_MS, Utc::now());
        assert!(!sidebar.state().visible);
    }

    #[test]
    fn left_side_slides_from_left() {
        let (mut sidebar, _) = host();
        sidebar.set_side(Side::Left);
        sidebar.show(0.0);
        assert!(sidebar.frame(0.0).offset_x < 0.0);
    }

    #[test]
    fn close_tears_down_overlay_and_panel() {
        let (mut sidebar, dom) = host();
        sidebar.show(0.0);
        assert!(sidebar.request_area_capture(Viewport::new(1280.0, 800.0)));
        assert_eq!(dom.total_nodes(), 2);

        sidebar.close();
        assert_eq!(dom.total_nodes(), 0);
        assert!(!sidebar.overlay().is_open());
        assert!(!sidebar.state().visible);
    }

    #[test]
    fn mount_failure_reports_false() {
        let dom = MemoryHost::default();
        dom.fail_create(true);
        let mut sidebar = SidebarHost::new(dom, Viewport::new(800.0, 600.0), SettingsHandle::default());
        assert!(!sidebar.show(0.0));
        assert!(!sidebar.state().visible);
        assert!(!sidebar.request_area_capture(Viewport::new(800.0, 600.0)));
        assert_eq!(sidebar.notices().active()[0].level, NoticeLevel::Error);
    }
}

#[cfg(test)]
mod layout_tests {
    use crate::capture_overlay::Viewport;
    use crate::config::{ExtensionSettings, SettingsHandle};
    use crate::sidebar::layout::MARGIN;
    use crate::sidebar::*;
    use crate::testing::MemoryHost;

    #[test]
    fn default_side_comes_from_settings() {
        let settings = SettingsHandle::new(ExtensionSettings {
            default_side: Side::Left,
            ..ExtensionSettings::default()
        });
        let sidebar = SidebarHost::new(MemoryHost::default(), Viewport::new(1280.0, 800.0), settings);
        assert_eq!(sidebar.state().side, Side::Left);
        assert_eq!(sidebar.state().position.x, MARGIN);
    }

    #[test]
    fn window_resize_reclamps_and_updates_overlay() {
        let mut sidebar = SidebarHost::new(
            MemoryHost::default(),
            Viewport::new(1920.0, 1080.0).scrolled_to(0.0, 300.0),
            SettingsHandle::default(),
        );
        sidebar.on_window_resize(Viewport::new(900.0, 700.0).scrolled_to(0.0, 450.0));
        let s = sidebar.state();
        assert_eq!(s.position.x, 900.0 - EXPANDED_WIDTH - MARGIN);
        assert!(s.position.y + s.size.height <= 700.0);

        let vp = sidebar.overlay().viewport();
        assert_eq!((vp.width, vp.height), (900.0, 700.0));
        assert_eq!(vp.scroll_y, 450.0);
    }

    #[test]
    fn header_drag_snaps_side() {
        let mut sidebar = SidebarHost::new(MemoryHost::default(), Viewport::new(1280.0, 800.0), SettingsHandle::default());
        assert!(!sidebar.drag_header(10.0, 10.0));

        sidebar.begin_header_drag(20.0);
        assert!(sidebar.drag_header(100.0, 70.0));
        sidebar.end_header_drag();
        assert_eq!(sidebar.state().side, Side::Left);
        assert_eq!(sidebar.state().position.y, MARGIN + 50.0);
        assert!(!sidebar.drag_header(1200.0, 70.0));
    }

    #[test]
    fn collapse_shrinks_to_rail() {
        let mut sidebar = SidebarHost::new(MemoryHost::default(), Viewport::new(1280.0, 800.0), SettingsHandle::default());
        sidebar.toggle_collapsed();
        assert!(sidebar.frame(0.0).collapsed);
        assert_eq!(sidebar.frame(0.0).width, COLLAPSED_WIDTH);
    }

    #[test]
    fn resize_height_is_bounded() {
        let mut sidebar = SidebarHost::new(MemoryHost::default(), Viewport::new(1280.0, 800.0), SettingsHandle::default());
        sidebar.resize_height(10_000.0);
        assert_eq!(sidebar.state().size.height, 800.0 - 2.0 * MARGIN);
    }
}

#[cfg(test)]
mod event_tests {
    use chrono::Utc;
    use image::{Rgba, RgbaImage};

    use crate::capture::{decode_data_url, CaptureMode, CapturedImage, TabCapture, VisibleAreaCapture};
    use crate::capture_overlay::{InteractionState, SelectionRect, Viewport};
    use crate::config::{ExtensionSettings, ImageFormat, SettingsHandle};
    use crate::sidebar::*;
    use crate::testing::{FakeTab, MemoryHost, ScriptedBackend};

    fn sidebar_with(settings: ExtensionSettings) -> SidebarHost<MemoryHost> {
        SidebarHost::new(
            MemoryHost::default(),
            Viewport::new(1280.0, 800.0),
            SettingsHandle::new(settings),
        )
    }

    fn select(sidebar: &mut SidebarHost<MemoryHost>) {
        assert!(sidebar.request_area_capture(Viewport::new(1280.0, 800.0)));
        let overlay = sidebar.overlay_mut();
        overlay.pointer_down(100.0, 100.0);
        overlay.pointer_up(300.0, 250.0);
        assert_eq!(overlay.state(), InteractionState::Selected);
    }

    #[tokio::test]
    async fn capture_adds_thumbnail() {
        let mut sidebar = sidebar_with(ExtensionSettings::default());
        sidebar.show(0.0);
        select(&mut sidebar);

        let backend = ScriptedBackend::new();
        sidebar.overlay_mut().capture_with(&backend).await;
        let handled = sidebar.process_events(Utc::now());

        assert_eq!(handled, 2);
        assert_eq!(sidebar.gallery().len(), 1);
        let entry = sidebar.gallery().latest().unwrap();
        assert_eq!((entry.width, entry.height), (200, 150));
        assert!(entry.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(sidebar.notices().active()[0].level, NoticeLevel::Success);
        assert!(!sidebar.frame(0.0).selecting);
    }

    #[tokio::test]
    async fn failure_becomes_one_error_notice() {
        let mut sidebar = sidebar_with(ExtensionSettings::default());
        select(&mut sidebar);

        let backend = ScriptedBackend::new();
        backend.fail_next("permission denied");
        sidebar.overlay_mut().capture_with(&backend).await;
        sidebar.process_events(Utc::now());

        let errors: Vec<_> = sidebar
            .notices()
            .active()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("permission denied"));
        assert!(sidebar.gallery().is_empty());
        assert!(sidebar.frame(0.0).selecting);
    }

    #[test]
    fn cancel_adds_nothing() {
        let mut sidebar = sidebar_with(ExtensionSettings::default());
        select(&mut sidebar);
        sidebar.overlay_mut().cancel();
        assert_eq!(sidebar.process_events(Utc::now()), 2);
        assert!(sidebar.gallery().is_empty());
        assert!(sidebar.notices().is_empty());
    }

    #[test]
    fn record_capture_uses_settings_format_and_limit() {
        let mut sidebar = sidebar_with(ExtensionSettings {
            image_format: ImageFormat::Jpeg,
            image_quality: 60,
            max_thumbnails: 2,
            ..ExtensionSettings::default()
        });
        let captured = CapturedImage {
            image: RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])),
            mode: CaptureMode::Viewport,
            source_rect: SelectionRect::new(0.0, 0.0, 8.0, 8.0),
        };
        let now = Utc::now();
        let first = sidebar.record_capture(&captured, now).unwrap();
        sidebar.record_capture(&captured, now);
        let third = sidebar.record_capture(&captured, now).unwrap();

        assert_eq!(sidebar.gallery().len(), 2);
        assert!(sidebar.gallery().get(&first).is_none());
        assert_eq!(sidebar.gallery().latest().map(|e| e.id.clone()), Some(third));
        assert!(sidebar
            .gallery()
            .latest()
            .unwrap()
            .data_url
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn hiding_cancels_selection() {
        let mut sidebar = sidebar_with(ExtensionSettings::default());
        sidebar.show(0.0);
        select(&mut sidebar);
        sidebar.hide(10.0);
        assert!(!sidebar.overlay().is_open());
    }

    #[tokio::test]
    async fn area_capture_uses_scroll_offset_at_open_time() {
        // Created at the top, then the page scrolls with the overlay closed
        let mut sidebar = sidebar_with(ExtensionSettings::default());
        let tab = FakeTab::new(Viewport::new(1280.0, 800.0).scrolled_to(0.0, 2000.0), 1280, 5000);

        assert!(sidebar.request_area_capture(tab.viewport()));
        assert_eq!(sidebar.overlay().viewport().scroll_y, 2000.0);

        let overlay = sidebar.overlay_mut();
        overlay.pointer_down(200.0, 200.0);
        overlay.pointer_up(400.0, 400.0);
        assert_eq!(
            overlay.selection(),
            Some(SelectionRect::new(200.0, 2200.0, 200.0, 200.0))
        );
        assert!(!overlay.frame().clipped_warning);

        let backend = VisibleAreaCapture::new(tab);
        overlay.capture_with(&backend).await;
        sidebar.process_events(Utc::now());

        assert!(sidebar
            .notices()
            .active()
            .iter()
            .all(|n| n.level != NoticeLevel::Error));
        let entry = sidebar.gallery().latest().unwrap();
        assert_eq!((entry.width, entry.height), (200, 200));
        let pixels = decode_data_url(&entry.data_url).unwrap();
        // FakeTab pixels encode page coordinates mod 256
        assert_eq!(pixels.get_pixel(0, 0).0[..2], [200, (2200 % 256) as u8]);
    }
}
