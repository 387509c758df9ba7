//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Defaults to `info`; override
/// with `RUST_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
