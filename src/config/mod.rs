//! # Configuration Management
//!
//! Layered configuration for the credential client. Sources are applied in
//! increasing priority: built-in defaults, the TOML file, then `JENKINS_*`
//! environment variables. Command-line flags are layered on top by the CLI.
//!
//! ```toml
//! [jenkins]
//! server_url = "https://jenkins.example.com"
//! username = "automation"
//! api_token = "11e0c3..."
//! timeout_seconds = 30
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

pub mod settings;

pub use settings::{Config, JenkinsConfig, LoggingConfig};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{Error, Result};

pub const ENV_URL: &str = "JENKINS_URL";
pub const ENV_USERNAME: &str = "JENKINS_USERNAME";
pub const ENV_PASSWORD: &str = "JENKINS_PASSWORD";
pub const ENV_TIMEOUT: &str = "JENKINS_TIMEOUT";
pub const ENV_CA_CERT: &str = "JENKINS_CA_CERT";
pub const ENV_LOG_LEVEL: &str = "JENKINS_CREDENTIALS_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "JENKINS_CREDENTIALS_LOG_JSON";

impl Config {
    /// Default configuration file path (`~/.jenkins-credentials/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).ok()?;

        let mut path = PathBuf::from(home);
        path.push(".jenkins-credentials");
        path.push("config.toml");
        Some(path)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file: {}", path.display()), e))?;

        toml::from_str(&contents).map_err(|e| {
            Error::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                Box::new(e),
            )
        })
    }

    /// Load file and environment layers.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise. The result is not
    /// validated, so callers can still layer flags on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Loading default config file");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env()?;
        Ok(config)
    }

    /// Apply `JENKINS_*` environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.jenkins.server_url = url;
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.jenkins.username = Some(username);
        }
        if let Some(token) = get(ENV_PASSWORD) {
            self.jenkins.api_token = Some(token.into());
        }
        if let Some(timeout) = get(ENV_TIMEOUT) {
            self.jenkins.timeout_seconds = timeout.trim().parse().map_err(|e| {
                Error::config(format!("Invalid {} value '{}': {}", ENV_TIMEOUT, timeout, e))
            })?;
        }
        if let Some(path) = get(ENV_CA_CERT) {
            self.jenkins.ca_cert_path = Some(PathBuf::from(path));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(json) = get(ENV_LOG_JSON) {
            self.logging.json = parse_bool(&json).ok_or_else(|| {
                Error::config(format!("Invalid {} value '{}': expected a boolean", ENV_LOG_JSON, json))
            })?;
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
