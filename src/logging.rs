//! Native logger setup.
//!
//! The browser build logs through `console_log` (installed by the content
//! script's start function). Native builds and tests use `env_logger`,
//! filtered by `RUST_LOG` and defaulting to `warn`.

/// Install the native logger. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .try_init();
}

/// No-op in the browser; see `pagesnap-content-script`.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {}
