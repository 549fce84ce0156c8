//! Transient notices shown at the top of the sidebar.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// How long a notice stays up
pub const NOTICE_TTL_SECS: i64 = 5;

/// Notices kept at once; older ones are dropped first
pub const MAX_NOTICES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct Notifications {
    notices: Vec<Notice>,
    next_id: u64,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>, now: DateTime<Utc>) -> u64 {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            level,
            message: message.into(),
            created_at: now,
        };
        match level {
            NoticeLevel::Error => log::warn!("[SIDEBAR] {}", notice.message),
            _ => log::debug!("[SIDEBAR] {}", notice.message),
        }
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drop notices older than the TTL. Returns true when anything changed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        let ttl = Duration::seconds(NOTICE_TTL_SECS);
        let before = self.notices.len();
        self.notices.retain(|n| now - n.created_at < ttl);
        self.notices.len() != before
    }

    /// Oldest first.
    pub fn active(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
