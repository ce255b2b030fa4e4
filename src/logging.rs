// src/logging.rs

//! Diagnostic logging for `sweepbuild`.
//!
//! The filter comes from, in order: the `--log-level` flag, the
//! `SWEEPBUILD_LOG` variable (plain levels or `EnvFilter` directives such as
//! `sweepbuild::exec=debug`), then `info`.
//!
//! Everything goes to stderr; stdout is reserved for the run summary and the
//! dry-run listing. Build output never reaches either stream, it lives in the
//! per-budget log files.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "SWEEPBUILD_LOG";

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = resolve_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("initialising logging: {e}"))
}

fn resolve_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return level_filter(lvl.into());
    }

    let Some(raw) = env_value.map(str::trim).filter(|s| !s.is_empty()) else {
        return level_filter(Level::INFO);
    };

    match parse_level_str(raw) {
        Some(level) => level_filter(level),
        None => EnvFilter::try_new(raw).unwrap_or_else(|e| {
            eprintln!("ignoring invalid {LOG_ENV}={raw:?}: {e}");
            level_filter(Level::INFO)
        }),
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(level.into())
}

/// Parse a bare level name (`"warning"` is accepted for `warn`).
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(Level::WARN),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(parse_level_str(" Debug "), Some(Level::DEBUG));
        assert_eq!(parse_level_str("warning"), Some(Level::WARN));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn cli_flag_wins_over_environment() {
        let filter = resolve_filter(Some(LogLevel::Trace), Some("error"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn environment_accepts_directives() {
        let filter = resolve_filter(None, Some("sweepbuild::exec=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn empty_environment_falls_back_to_info() {
        let blank = resolve_filter(None, Some("  "));
        assert_eq!(blank.max_level_hint(), Some(LevelFilter::INFO));
        let unset = resolve_filter(None, None);
        assert_eq!(unset.max_level_hint(), Some(LevelFilter::INFO));
    }
}
