//! Configuration resolution for the CLI
//!
//! Layers command-line flags over [`Config::load`] (config file, then
//! `JENKINS_*` environment variables) and validates the result.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;

/// Connection settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub config_file: Option<PathBuf>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<u64>,
    pub verbose: bool,
}

/// Resolve the effective configuration
///
/// Checks sources in the following priority order:
/// 1. command line flags
/// 2. JENKINS_* environment variables
/// 3. --config file, or ~/.jenkins-credentials/config.toml
/// 4. Defaults
pub fn resolve_config(overrides: ConnectionOverrides) -> Result<Config> {
    let mut config = Config::load(overrides.config_file.as_deref())
        .context("Failed to load configuration")?;

    if let Some(url) = overrides.url {
        debug!("Using Jenkins URL from --url flag: {}", url);
        config.jenkins.server_url = url;
    }
    if let Some(username) = overrides.username {
        debug!("Using username from --username flag");
        config.jenkins.username = Some(username);
    }
    if let Some(token) = overrides.token {
        debug!("Using API token from --token flag");
        config.jenkins.api_token = Some(token.into());
    }
    if let Some(timeout) = overrides.timeout {
        config.jenkins.timeout_seconds = timeout;
    }
    if overrides.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
