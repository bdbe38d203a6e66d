//! Server configuration from the environment (and an optional `.env` file).
//!
//! HOST (default 0.0.0.0), PORT (default 8080), ADMIN_KEY (unset: no permission check),
//! DEFAULT_BRACKET_SIZE (default 8).

use crate::bracket::templates::{self, SUPPORTED_SIZES};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("DEFAULT_BRACKET_SIZE must be one of {sizes:?}, got {0:?}", sizes = SUPPORTED_SIZES)]
    UnsupportedBracketSize(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub admin_key: Option<String>,
    pub default_bracket_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_key: None,
            default_bracket_size: templates::TOP_8,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        config.admin_key = get("ADMIN_KEY");
        if let Some(size) = get("DEFAULT_BRACKET_SIZE") {
            config.default_bracket_size = size
                .trim()
                .parse()
                .ok()
                .filter(|s| SUPPORTED_SIZES.contains(s))
                .ok_or(ConfigError::UnsupportedBracketSize(size))?;
        }
        Ok(config)
    }
}
