//! Extension configuration.
//!
//! Settings are owned by the options page and persisted by the extension's
//! storage layer. This crate only reads them: the content script parses the
//! stored JSON into `ExtensionSettings` and shares it through a
//! `SettingsHandle` (`parking_lot::RwLock`, non-poisoning, snapshot reads).

pub mod settings;

pub use settings::{ExtensionSettings, ImageFormat, SettingsHandle, Theme};
