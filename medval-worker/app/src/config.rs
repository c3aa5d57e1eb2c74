//! Worker configuration.
//!
//! Values are resolved in three layers, later layers overriding earlier ones:
//! 1. Built-in defaults
//! 2. An optional `config.yaml` found in the search paths
//! 3. Environment variables prefixed with `APP_`, using `__` between
//!    nested keys (`APP_SERVER__PORT=9000`, `APP_LOGGING__JSON=true`)
//!
//! Example `config.yaml`:
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//!   shutdown_timeout: 30s
//!   body_limit: 4194304
//! logging:
//!   level: info
//!   json: false
//! ```

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in every search path.
pub const CONFIG_FILE_NAME: &str = "config.yaml";
/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "APP";

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to load configuration")]
    Load(#[source] config::ConfigError),
    #[error("invalid server port: {0}")]
    InvalidPort(u16),
    #[error("server host must not be empty")]
    EmptyHost,
    #[error("server body limit must be greater than zero")]
    ZeroBodyLimit,
}

/// Worker configuration.
#[derive(PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Configuration file the values were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Time allowed for in-flight requests to finish once shutdown starts.
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// Maximum request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
            body_limit: default_body_limit(),
        }
    }
}

impl ServerConfig {
    /// Listen address in `host:port` form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging settings. `RUST_LOG`, when set, takes precedence over `level`.
#[derive(PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_body_limit() -> usize {
    medval_http::DEFAULT_BODY_LIMIT
}

fn default_level() -> String {
    "info".to_string()
}

/// Directories searched for [`CONFIG_FILE_NAME`], in order.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("."), PathBuf::from("./configs")];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(Path::new(&home).join(".config"));
    }
    paths
}

impl AppConfig {
    /// Loads configuration from the default search paths and the process environment.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&default_search_paths(), None)
    }

    /// Loads configuration from the given search paths.
    ///
    /// # Arguments
    /// * `search_paths` - Directories searched for the configuration file, first match wins
    /// * `env` - Environment to read overrides from, the process environment when `None`
    pub fn load_from(
        search_paths: &[PathBuf],
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, Error> {
        let source = search_paths
            .iter()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file());

        let mut builder = config::Config::builder();
        if let Some(path) = &source {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let mut config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(Error::Load)?;
        config.source = source;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be served.
    pub fn validate(&self) -> Result<(), Error> {
        if self.server.port == 0 {
            return Err(Error::InvalidPort(self.server.port));
        }
        if self.server.host.trim().is_empty() {
            return Err(Error::EmptyHost);
        }
        if self.server.body_limit == 0 {
            return Err(Error::ZeroBodyLimit);
        }
        Ok(())
    }
}
