//! `tracing-subscriber` bootstrap for the server binary.
//!
//! `RUST_LOG`, when set, overrides the configured level.

use clap::ValueEnum;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `todo_server=debug,tower=warn`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Build the event filter: `RUST_LOG` first, then the configured level.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    select_filter(from_env.as_deref(), &config.level)
}

/// A set but malformed `RUST_LOG` is an error, not a silent fallback.
fn select_filter(from_env: Option<&str>, level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = match from_env.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive,
        _ => level,
    };
    EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_pretty_info() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn bad_configured_level_is_reported() {
        assert!(matches!(
            select_filter(None, "todo_server=notalevel"),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[test]
    fn bad_rust_log_is_reported() {
        let err = select_filter(Some("todo_server=notalevel"), "info").unwrap_err();
        match err {
            LoggingError::Filter { directive, .. } => {
                assert_eq!(directive, "todo_server=notalevel")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        assert!(select_filter(Some("warn"), "todo_server=notalevel").is_ok());
    }

    #[test]
    fn blank_rust_log_falls_back_to_level() {
        assert!(select_filter(Some("  "), "debug").is_ok());
        match select_filter(Some(""), "todo_server=notalevel") {
            Err(LoggingError::Filter { directive, .. }) => {
                assert_eq!(directive, "todo_server=notalevel")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
