//! Logging setup
//!
//! The engine only emits `tracing` events. Hosts that want them on stderr can
//! call [`init`]; hosts with their own subscriber should skip it.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Install a stderr subscriber filtered by `RUST_LOG` or the configured level.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(level = %config.level, "logging initialized");
    }
    installed
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
