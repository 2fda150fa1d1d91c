//! Logging setup for the engine.
//!
//! Thin wrapper over `log` and `env_logger` so applications get consistent
//! output without wiring up a logger themselves. Control verbosity with the
//! `RUST_LOG` environment variable, e.g. `RUST_LOG=viewer_engine=debug`.

pub use log::{debug, error, info, trace, warn};

/// Initialize the global logger. Call once at application startup.
pub fn init() {
    env_logger::init();
}
