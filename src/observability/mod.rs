//! # Observability
//!
//! Structured logging for the credential client: subscriber setup and the
//! span macros every lifecycle operation runs under.

pub mod logging;

pub use logging::{init_logging, log_config_info};
