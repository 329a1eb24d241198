//! # Structured Logging
//!
//! Provides logging initialisation and span macros using the tracing ecosystem.
//!
//! Secret-bearing values never reach a log line: they are held in
//! [`SecretString`](crate::secrets::SecretString), which redacts itself in
//! `Debug`, `Display` and `Serialize`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LoggingConfig};
use crate::errors::{Error, Result};

/// Create a tracing span for one credential lifecycle operation.
///
/// ```rust,ignore
/// let span = credential_span!("create", coordinate.folder(), coordinate.domain(), coordinate.name());
/// ```
#[macro_export]
macro_rules! credential_span {
    ($operation:expr, $folder:expr, $domain:expr, $name:expr) => {
        tracing::info_span!(
            "credential_operation",
            operation = %$operation,
            folder = %$folder,
            domain = %$domain,
            name = %$name,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $folder:expr, $domain:expr, $name:expr, $($field:tt)*) => {
        tracing::info_span!(
            "credential_operation",
            operation = %$operation,
            folder = %$folder,
            domain = %$domain,
            name = %$name,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the level filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(&config.level),
    }
    .map_err(|e| {
        Error::config_with_source(format!("Invalid log filter '{}'", config.level), Box::new(e))
    })
}

/// Install the global subscriber, writing to stderr.
///
/// Calling this when a subscriber is already installed (tests, embedders) is
/// not an error.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    // An already-installed subscriber wins.
    let _ = if config.json { builder.json().try_init() } else { builder.compact().try_init() };
    Ok(())
}

/// Log the effective connection settings at startup. The token is redacted.
pub fn log_config_info(config: &Config) {
    tracing::debug!(
        server_url = %config.jenkins.server_url,
        username = config.jenkins.username.as_deref().unwrap_or("<anonymous>"),
        api_token_set = config.jenkins.api_token.is_some(),
        timeout_seconds = config.jenkins.timeout_seconds,
        ca_cert = config.jenkins.ca_cert_path.is_some(),
        log_level = %config.logging.level,
        json = config.logging.json,
        "Jenkins credential client configuration"
    );
}
