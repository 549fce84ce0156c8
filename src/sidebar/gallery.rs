//! Thumbnail gallery of recent captures.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::capture::{encode_image, CaptureMode, CapturedImage};
use crate::config::ExtensionSettings;
use crate::error::PageSnapResult;

/// One captured image, encoded for display and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CaptureEntry {
    pub id: String,
    #[ts(type = "string")]
    pub captured_at: DateTime<Utc>,
    pub mode: CaptureMode,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

impl CaptureEntry {
    /// Encode `captured` with the user's format/quality.
    pub fn from_capture(
        captured: &CapturedImage,
        settings: &ExtensionSettings,
        now: DateTime<Utc>,
    ) -> PageSnapResult<Self> {
        let encoded = encode_image(&captured.image, settings.image_format, settings.image_quality)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            captured_at: now,
            mode: captured.mode,
            width: captured.width(),
            height: captured.height(),
            data_url: encoded.to_data_url(),
        })
    }

    /// Suggested download name, e.g. `pagesnap-20240131-154501.png`.
    pub fn file_name(&self, settings: &ExtensionSettings) -> String {
        format!(
            "pagesnap-{}.{}",
            self.captured_at.format("%Y%m%d-%H%M%S"),
            settings.image_format.extension()
        )
    }
}

/// Newest-first list bounded by `max_entries`.
#[derive(Debug, Clone)]
pub struct Gallery {
    entries: VecDeque<CaptureEntry>,
    max_entries: usize,
}

impl Gallery {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Add an entry at the front; the oldest entries beyond the limit are
    /// evicted.
    pub fn add(&mut self, entry: CaptureEntry) {
        self.entries.push_front(entry);
        self.evict();
    }

    pub fn remove(&mut self, id: &str) -> Option<CaptureEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            if let Some(old) = self.entries.pop_back() {
                log::debug!("[SIDEBAR] Evicted thumbnail {}", old.id);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&CaptureEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn latest(&self) -> Option<&CaptureEntry> {
        self.entries.front()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CaptureEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
