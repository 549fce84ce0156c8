//! Extension settings.
//!
//! The options page stores one JSON blob; the content script reads it at
//! startup and whenever storage changes. Parsing never fails hard: missing
//! fields take their defaults and a malformed blob falls back to the default
//! settings with a warning.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{PageSnapError, PageSnapResult};
use crate::sidebar::Side;

/// Colour scheme of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Value of the panel's `data-theme` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

/// Output format for captured images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

/// User preferences read by the sidebar and the capture pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct ExtensionSettings {
    pub theme: Theme,
    /// Download every capture without asking.
    pub auto_save: bool,
    pub image_format: ImageFormat,
    /// Lossy encoding quality (1-100). Ignored for PNG and WebP.
    pub image_quality: u8,
    /// Copy every capture to the clipboard.
    pub copy_to_clipboard: bool,
    /// Thumbnails kept in the sidebar gallery.
    pub max_thumbnails: usize,
    /// Side the sidebar opens on.
    pub default_side: Side,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            auto_save: false,
            image_format: ImageFormat::Png,
            image_quality: 92,
            copy_to_clipboard: false,
            max_thumbnails: 12,
            default_side: Side::Right,
        }
    }
}

impl ExtensionSettings {
    pub const MAX_THUMBNAILS_LIMIT: usize = 100;

    /// Validate and clamp settings to acceptable ranges.
    pub fn validate(&mut self) {
        self.image_quality = self.image_quality.clamp(1, 100);
        self.max_thumbnails = self.max_thumbnails.clamp(1, Self::MAX_THUMBNAILS_LIMIT);
    }

    /// Strict parse, for callers that want to surface the error.
    pub fn try_from_json(raw: &str) -> PageSnapResult<Self> {
        let mut settings: Self = serde_json::from_str(raw)
            .map_err(|e| PageSnapError::Settings(format!("invalid settings blob: {}", e)))?;
        settings.validate();
        Ok(settings)
    }

    /// Lenient parse: anything unreadable yields the defaults.
    pub fn from_json(raw: &str) -> Self {
        match Self::try_from_json(raw) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("[SETTINGS] {}, using defaults", e);
                Self::default()
            }
        }
    }
}

/// Shared, read-mostly settings.
///
/// Readers take snapshots; storage changes replace the whole value.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle(Arc<RwLock<ExtensionSettings>>);

impl SettingsHandle {
    pub fn new(settings: ExtensionSettings) -> Self {
        Self(Arc::new(RwLock::new(settings)))
    }

    pub fn snapshot(&self) -> ExtensionSettings {
        self.0.read().clone()
    }

    pub fn replace(&self, mut settings: ExtensionSettings) {
        settings.validate();
        log::debug!("[SETTINGS] replaced: {:?}", settings);
        *self.0.write() = settings;
    }

    /// Apply a storage change notification.
    pub fn reload_from_json(&self, raw: &str) {
        self.replace(ExtensionSettings::from_json(raw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = ExtensionSettings::default();
        assert_eq!(s.theme, Theme::System);
        assert_eq!(s.image_format, ImageFormat::Png);
        assert_eq!(s.default_side, Side::Right);
        assert!(!s.auto_save);
    }

    #[test]
    fn test_parse_camel_case() {
        let raw = r#"{
            "theme": "dark",
            "autoSave": true,
            "imageFormat": "jpeg",
            "imageQuality": 70,
            "copyToClipboard": true,
            "maxThumbnails": 5,
            "defaultSide": "left"
        }"#;
        let s = ExtensionSettings::from_json(raw);
        assert_eq!(s.theme, Theme::Dark);
        assert!(s.auto_save);
        assert_eq!(s.image_format, ImageFormat::Jpeg);
        assert_eq!(s.image_quality, 70);
        assert!(s.copy_to_clipboard);
        assert_eq!(s.max_thumbnails, 5);
        assert_eq!(s.default_side, Side::Left);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s = ExtensionSettings::from_json(r#"{"imageFormat":"webp"}"#);
        assert_eq!(s.image_format, ImageFormat::Webp);
        assert_eq!(s.image_quality, ExtensionSettings::default().image_quality);
        assert_eq!(s.max_thumbnails, 12);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let s = ExtensionSettings::from_json(r#"{"imageQuality":0,"maxThumbnails":0}"#);
        assert_eq!(s.image_quality, 1);
        assert_eq!(s.max_thumbnails, 1);

        let s = ExtensionSettings::from_json(r#"{"imageQuality":250,"maxThumbnails":5000}"#);
        assert_eq!(s.image_quality, 100);
        assert_eq!(s.max_thumbnails, ExtensionSettings::MAX_THUMBNAILS_LIMIT);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert!(ExtensionSettings::try_from_json("{oops").is_err());
        assert_eq!(ExtensionSettings::from_json("{oops"), ExtensionSettings::default());
        assert_eq!(
            ExtensionSettings::from_json(r#"{"theme":"sepia"}"#),
            ExtensionSettings::default()
        );
    }

    #[test]
    fn test_handle_snapshot_and_replace() {
        let handle = SettingsHandle::default();
        let reader = handle.clone();
        handle.reload_from_json(r#"{"imageFormat":"jpeg","imageQuality":101}"#);
        let snap = reader.snapshot();
        assert_eq!(snap.image_format, ImageFormat::Jpeg);
        assert_eq!(snap.image_quality, 100);
    }

    #[test]
    fn test_image_format_metadata() {
        assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Webp.mime(), "image/webp");
        assert_eq!(Theme::default().as_str(), "system");
    }
}
