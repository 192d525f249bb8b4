//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use idpool_core::config::logging::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. Returns `false` if a global
/// subscriber was already installed, which is harmless in tests.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };
    installed.is_ok()
}
