//! Tracing subscriber initialization.
//!
//! The server does not install a subscriber on its own; applications call
//! [`init_tracing`] once at startup. Development mode lowers the default
//! filter to `debug` and keeps human-readable output; otherwise events
//! are emitted as JSON lines. `RUST_LOG` overrides the default filter
//! either way.

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Installs the global tracing subscriber for the configured mode.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(config: &ServerConfig) {
    let default_filter = if config.dev_mode() { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if config.dev_mode() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    }
}
