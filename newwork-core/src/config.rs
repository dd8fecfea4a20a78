//! Client configuration
//!
//! The base origin is supplied once at process start. Its absence is a startup-time
//! misconfiguration; nothing re-validates it per request.

use crate::error::{ErrorContext, NewworkError, NewworkResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the backend base origin
pub const API_URL_ENV: &str = "NEWWORK_API_URL";
pub const TIMEOUT_ENV: &str = "NEWWORK_TIMEOUT_SECONDS";
pub const USER_AGENT_ENV: &str = "NEWWORK_USER_AGENT";

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Configuration for the HTTP request layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base origin every request path is appended to
    pub base_url: String,
    /// Authentication resource, relative to `base_url`
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("newwork-client/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Create a configuration for the given base origin with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: default_login_path(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> NewworkResult<Self> {
        let base_url = std::env::var(API_URL_ENV).map_err(|e| NewworkError::Config {
            message: format!("{} is not set: {}", API_URL_ENV, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("from_env")
                .with_suggestion("Export NEWWORK_API_URL=http://host:port or add it to .env"),
        })?;

        let mut config = Self::new(base_url);

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.timeout_seconds = raw.parse().map_err(|e| NewworkError::Config {
                message: format!("{} must be an integer, got '{}'", TIMEOUT_ENV, raw),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config").with_operation("from_env"),
            })?;
        }
        if let Ok(user_agent) = std::env::var(USER_AGENT_ENV) {
            config.user_agent = user_agent;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> NewworkResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| NewworkError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| NewworkError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> NewworkResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| NewworkError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| NewworkError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> NewworkResult<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| NewworkError::Config {
            message: format!("Invalid base_url '{}': {}", self.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as http://localhost:8080"),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NewworkError::Config {
                message: format!("base_url must use http or https, got '{}'", parsed.scheme()),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if !self.login_path.starts_with('/') {
            return Err(NewworkError::Config {
                message: format!("login_path must start with '/', got '{}'", self.login_path),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if self.timeout_seconds == 0 {
            return Err(NewworkError::Config {
                message: "timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set timeout_seconds to a positive value"),
            });
        }

        Ok(())
    }

    /// Absolute URL for a resource path
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_normalizes_slashes() {
        let config = ClientConfig::new("http://localhost:8080/");
        assert_eq!(
            config.url_for("/api/employees"),
            "http://localhost:8080/api/employees"
        );
        assert_eq!(config.url_for("auth/login"), "http://localhost:8080/auth/login");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("http://localhost:8080").validate().is_ok());
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("ftp://example.com").validate().is_err());

        let mut config = ClientConfig::new("https://api.example.com");
        config.login_path = "auth/login".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::new("https://api.example.com");
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newwork.toml");

        let mut config = ClientConfig::new("http://127.0.0.1:9000");
        config.timeout_seconds = 5;
        config.save_to_file(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_file_defaults_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.toml");
        std::fs::write(&path, "base_url = \"http://localhost:8080\"\n").unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.login_path, DEFAULT_LOGIN_PATH);
        assert_eq!(loaded.timeout_seconds, 30);
    }
}
