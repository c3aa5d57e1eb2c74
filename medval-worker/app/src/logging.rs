//! Structured logging setup.
//!
//! Text output for development, JSON output for production. `RUST_LOG`, when
//! set, overrides the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid log level {1:?}")]
    InvalidLevel(#[source] tracing_subscriber::filter::ParseError, String),
    #[error("failed to install global tracing subscriber")]
    Init(#[source] tracing_subscriber::util::TryInitError),
}

/// Builds the filter from `RUST_LOG`, falling back to the configured level.
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, Error> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::InvalidLevel(e, config.level.clone())),
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), Error> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    result.map_err(Error::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            level: "medval=loud".to_string(),
            json: false,
        };
        assert!(matches!(env_filter(&config), Err(Error::InvalidLevel(..))));
    }

    #[test]
    fn test_valid_levels_accepted() {
        for level in ["trace", "debug", "info", "warn", "error", "medval=debug,tower_http=info"] {
            let config = LoggingConfig {
                level: level.to_string(),
                json: true,
            };
            assert!(env_filter(&config).is_ok(), "rejected {level}");
        }
    }
}
