//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Environment variable whose directives take precedence over the configured filter.
pub const LOG_ENV: &str = "CRUDKIT_LOG";

/// Install a global fmt subscriber.
///
/// Uses `CRUDKIT_LOG` when set, otherwise `filter` (e.g. `"info"` or
/// `"crudkit=debug"`). Returns false if a subscriber was already installed.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
