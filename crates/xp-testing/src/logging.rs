//! Test logging setup

use crate::config::LOG_ENV;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "warn";

/// Install a tracing subscriber that writes through the test harness
///
/// Filter directives come from `XP_LOG` (e.g. `XP_LOG=xp_testing=debug`).
/// `log` records from the library crates are forwarded as well. Safe to call
/// from every test; only the first call installs anything, and an existing
/// global subscriber is left alone.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("logging initialised twice without panicking");
    }
}
