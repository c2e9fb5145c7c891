use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global `tracing` subscriber. `RUST_LOG` wins over the
/// configured level. Safe to call more than once.
pub fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
