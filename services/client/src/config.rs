//! services/client/src/config.rs
//!
//! Defines the client's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use tracing::Level;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
const DEFAULT_ROOT_PATH: &str = "/";
const DEFAULT_SESSION_FILE: &str = ".moviereview_session.json";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Root-relative hrefs are joined onto this.
    pub api_base_url: Url,
    /// Where the root document lives, relative to the base URL.
    pub root_path: String,
    /// File backing the persisted session.
    pub session_file: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url_str =
            lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&base_url_str)
            .map_err(|e| ConfigError::InvalidValue("API_BASE_URL".to_string(), e.to_string()))?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' cannot be used as a base URL", base_url_str),
            ));
        }

        let root_path = lookup("ROOT_PATH").unwrap_or_else(|| DEFAULT_ROOT_PATH.to_string());

        let session_file = lookup("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            root_path,
            session_file,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5001/");
        assert_eq!(config.root_path, "/");
        assert_eq!(config.session_file, PathBuf::from(".moviereview_session.json"));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "https://reviews.example.com/api/"),
            ("ROOT_PATH", "/api/"),
            ("SESSION_FILE", "/tmp/session.json"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("reviews.example.com"));
        assert_eq!(config.root_path, "/api/");
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::from_lookup(lookup(&[("API_BASE_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "API_BASE_URL"));

        let err = Config::from_lookup(lookup(&[("API_BASE_URL", "mailto:a@b.c")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "API_BASE_URL"));
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Config::from_lookup(lookup(&[("RUST_LOG", "chatty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "RUST_LOG"));
    }
}
