//! PageSnap capture core.
//!
//! Everything the PageSnap content script needs that does not touch the DOM:
//! area selection and its capture overlay, the sidebar host, the capture
//! pipeline, settings and errors. The browser binding lives in
//! `wasm/content-script`.

pub mod capture;
pub mod capture_overlay;
pub mod config;
pub mod error;
pub mod logging;
pub mod sidebar;

#[cfg(test)]
mod testing;

pub use error::{PageSnapError, PageSnapResult};
