//! Logger setup for the pacwall binary.
//!
//! Diagnostics go to stderr through `tracing`. The filter is read from
//! `PACWALL_LOG` using `EnvFilter` syntax (`debug`, `pacwall_opts=trace`, ...)
//! and defaults to warnings only, so a normal run prints nothing but the
//! soft-fallback warnings.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "PACWALL_LOG";

/// Filter used when `PACWALL_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Build a filter from a directive string, falling back to
/// [`DEFAULT_LOG_FILTER`] when it is missing or does not parse.
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global stderr subscriber, filtered by `PACWALL_LOG`.
pub fn init() -> Result<()> {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter_from(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_is_warn() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_directives_are_used() {
        assert_eq!(
            filter_from(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_invalid_directives_fall_back() {
        assert_eq!(
            filter_from(Some("pacwall_opts=loudest")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
