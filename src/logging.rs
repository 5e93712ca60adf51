// src/logging.rs

//! Log filter resolution and subscriber setup.
//!
//! The filter comes from the first source that yields one:
//! 1. `--log-level`, applied to every target;
//! 2. `LAZYDAG_LOG`, parsed as an `EnvFilter` directive list, so
//!    `lazydag::dag=debug,info` narrows graph tracing to one module;
//! 3. `info`.
//!
//! Output goes to stderr; stdout carries the printed plan.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "LAZYDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directives = std::env::var(LOG_ENV_VAR).ok();
    let filter = resolve_filter(cli_level, directives.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

/// Build the filter from an optional CLI level and optional directives.
///
/// Blank or unparsable directives fall back to `info`.
pub fn resolve_filter(cli_level: Option<LogLevel>, directives: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level_directive(level));
    }

    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn defaults_to_info() {
        assert_eq!(resolve_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(resolve_filter(None, Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn module_directives_are_honoured() {
        let filter = resolve_filter(None, Some("lazydag::dag=debug,warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn cli_level_overrides_directives() {
        let filter = resolve_filter(Some(LogLevel::Error), Some("lazydag=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }
}
