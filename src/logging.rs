//! Tracing subscriber setup.
//!
//! `log_format` selects `json` (log aggregation) or `text` (terminal).
//! `RUST_LOG` overrides `log_level` when set.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the level directive is malformed or a global
/// subscriber is already installed.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        let first = init("info", "text");
        let second = init("info", "json");

        // Another test may have installed a subscriber first.
        assert!(first.is_ok() || second.is_err());
        assert!(second.is_err());
    }
}
