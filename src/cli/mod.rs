//! # Command Line Interface
//!
//! Drives the credential lifecycle against a Jenkins controller: create,
//! read, update and delete from declaration files, import by id, and
//! read-only lookups.

pub mod config;
pub mod credentials;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

use crate::observability::{init_logging, log_config_info};
use crate::store::JenkinsCredentialStore;
use credentials::CredentialCommands;
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "jenkins-credentials")]
#[command(about = "Manage Jenkins Azure service principal credentials declaratively")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: CredentialCommands,

    /// Configuration file (defaults to ~/.jenkins-credentials/config.toml)
    #[arg(long, global = true, env = "JENKINS_CREDENTIALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Jenkins base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Jenkins user for basic authentication
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Jenkins API token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::resolve_config(config::ConnectionOverrides {
        config_file: cli.config,
        url: cli.url,
        username: cli.username,
        token: cli.token,
        timeout: cli.timeout,
        verbose: cli.verbose,
    })?;

    init_logging(&config.logging)?;
    log_config_info(&config);

    let store = JenkinsCredentialStore::new(&config.jenkins)?;
    credentials::handle_credential_command(cli.command, store, cli.output).await
}
