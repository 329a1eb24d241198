//! # Configuration Settings
//!
//! Defines the configuration structure for the Jenkins credential client.

use crate::errors::{Error, Result};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct Config {
    /// Jenkins connection configuration
    #[validate(nested)]
    pub jenkins: JenkinsConfig,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        self.validate_custom()?;

        Ok(())
    }

    fn validate_custom(&self) -> Result<()> {
        let url = url::Url::parse(&self.jenkins.server_url).map_err(|e| {
            Error::validation_field(
                format!("Invalid Jenkins server URL '{}': {}", self.jenkins.server_url, e),
                "server_url",
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::validation_field(
                "Jenkins server URL must be an http:// or https:// URL with a host",
                "server_url",
            ));
        }

        Ok(())
    }
}

/// Jenkins connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct JenkinsConfig {
    /// Jenkins base URL (e.g., "https://jenkins.example.com")
    #[validate(length(min = 1, message = "Jenkins server URL cannot be empty"))]
    pub server_url: String,

    /// User for HTTP basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// API token or password for HTTP basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<SecretString>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Extra PEM CA certificate to trust
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            username: None,
            api_token: None,
            timeout_seconds: 30,
            ca_cert_path: None,
        }
    }
}

impl JenkinsConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, overridden by `RUST_LOG`
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jenkins.timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_timeout_range() {
        let mut config = Config::default();
        config.jenkins.timeout_seconds = 0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, Error::Validation { field: Some(ref f), .. } if f == "jenkins.timeout_seconds")
        );
        assert!(err.to_string().contains("between 1 and 300"));

        config.jenkins.timeout_seconds = 301;
        assert!(config.validate().is_err());

        config.jenkins.timeout_seconds = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_url_validation() {
        let mut config = Config::default();

        config.jenkins.server_url = String::new();
        assert!(config.validate().is_err());

        config.jenkins.server_url = "ftp://jenkins.example.com".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Validation { field: Some(ref f), .. } if f == "server_url"));

        config.jenkins.server_url = "jenkins.example.com".to_string();
        assert!(config.validate().is_err());

        config.jenkins.server_url = "https://jenkins.example.com/ci/".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [jenkins]
            server_url = "https://ci.example.com"
            api_token = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.jenkins.server_url, "https://ci.example.com");
        assert_eq!(config.jenkins.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert!(!format!("{:?}", config).contains("abc"));
    }
}
