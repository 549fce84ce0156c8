//! Central error types for PageSnap.
//!
//! This module provides typed errors for the capture core, the sidebar and
//! the browser binding. All errors implement `Serialize` so they can be handed
//! to the content script's JavaScript side as plain strings.

use serde::Serialize;
use thiserror::Error;

use crate::capture_overlay::InteractionState;

/// Main error type for PageSnap operations.
#[derive(Error, Debug)]
pub enum PageSnapError {
    /// The capture capability rejected or failed
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The requested region has no visible pixels
    #[error("Selection does not intersect the visible viewport")]
    InvalidRegion,

    /// Image encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Image decoding/processing failed
    #[error("Image error: {0}")]
    Image(String),

    /// Overlay root could not be mounted or removed
    #[error("Portal error: {0}")]
    Portal(String),

    /// Settings could not be read
    #[error("Settings error: {0}")]
    Settings(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A selection operation was called from a state that does not allow it
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: InteractionState,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl PageSnapError {
    /// Shorthand for a rejected state transition.
    pub fn invalid_transition(action: &'static str, state: InteractionState) -> Self {
        PageSnapError::InvalidTransition { action, state }
    }

    /// Message shown to the user in the sidebar notification area.
    pub fn user_message(&self) -> String {
        match self {
            PageSnapError::Capture(_) => format!("Screenshot failed. {}", self),
            PageSnapError::InvalidRegion => {
                "Nothing to capture: the selection is outside the visible page.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Errors cross the wasm boundary as their message.
impl Serialize for PageSnapError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<image::ImageError> for PageSnapError {
    fn from(err: image::ImageError) -> Self {
        PageSnapError::Image(err.to_string())
    }
}

impl From<base64::DecodeError> for PageSnapError {
    fn from(err: base64::DecodeError) -> Self {
        PageSnapError::Image(format!("invalid base64 payload: {}", err))
    }
}

impl From<String> for PageSnapError {
    fn from(msg: String) -> Self {
        PageSnapError::Other(msg)
    }
}

impl From<&str> for PageSnapError {
    fn from(msg: &str) -> Self {
        PageSnapError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// # Example
/// ```ignore
/// use crate::error::{ResultExt, PageSnapResult};
///
/// fn parse(raw: &str) -> PageSnapResult<Value> {
///     serde_json::from_str(raw).context("failed to parse stored settings")
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to PageSnapError::Other.
    fn context(self, msg: &str) -> PageSnapResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> PageSnapResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> PageSnapResult<T> {
        self.map_err(|e| PageSnapError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> PageSnapResult<T> {
        self.map_err(|e| PageSnapError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to PageSnapError::Other with the given message.
    fn context(self, msg: &str) -> PageSnapResult<T>;

    /// Convert None to PageSnapError::Other with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> PageSnapResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> PageSnapResult<T> {
        self.ok_or_else(|| PageSnapError::Other(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> PageSnapResult<T> {
        self.ok_or_else(|| PageSnapError::Other(f()))
    }
}

/// Type alias for Results using PageSnapError.
pub type PageSnapResult<T> = Result<T, PageSnapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PageSnapError::Capture("tab not focused".to_string());
        assert_eq!(err.to_string(), "Capture failed: tab not focused");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = PageSnapError::invalid_transition("begin a resize", InteractionState::Idle);
        assert_eq!(err.to_string(), "Cannot begin a resize while idle");
    }

    #[test]
    fn test_error_serialization() {
        let err = PageSnapError::InvalidRegion;
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("visible viewport"));
    }

    #[test]
    fn test_user_message_for_capture_failure() {
        let err = PageSnapError::Capture("quota exceeded".to_string());
        let msg = err.user_message();
        assert!(msg.starts_with("Screenshot failed."));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_from_string() {
        let err: PageSnapError = "test error".into();
        assert!(matches!(err, PageSnapError::Other(_)));
    }

    #[test]
    fn test_from_json_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: PageSnapError = parse.unwrap_err().into();
        assert!(matches!(err, PageSnapError::Json(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let with_context = result.context("operation failed");

        let msg = with_context.unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), &str> = Err("inner");
        let msg = result
            .with_context(|| format!("ctx-{}", 42))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("ctx-42"));
        assert!(msg.contains("inner"));
    }

    #[test]
    fn test_result_ext_ok_passthrough() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(result.context("should not appear").unwrap(), 42);
    }

    #[test]
    fn test_option_ext_context() {
        let opt: Option<i32> = None;
        let result = opt.context("value was missing");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("value was missing"));
    }

    #[test]
    fn test_option_ext_with_context() {
        let opt: Option<i32> = None;
        let msg = opt
            .with_context(|| format!("missing value at index {}", 5))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("missing value at index 5"));
    }
}
