//! Credential lifecycle commands
//!
//! Declarations are TOML files (JSON when the extension is `.json`) holding
//! the declared fields, optionally with the `id` of an existing credential:
//!
//! ```toml
//! name = "sp1"
//! folder = "teamA"
//! subscription_id = "sub-1"
//! client_id = "cid-1"
//! client_secret = "secret-1"
//! tenant = "ten-1"
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::output::{print_output, OutputFormat};
use crate::resource::{
    AzureServicePrincipalDataSource, AzureServicePrincipalQuery, AzureServicePrincipalResource,
    ResourceState,
};
use crate::store::CredentialStore;

#[derive(Subcommand, Debug)]
pub enum CredentialCommands {
    /// Create the declared credential
    Create(DeclarationArgs),

    /// Refresh the declared credential from Jenkins
    Read(DeclarationArgs),

    /// Push declared changes to an existing credential
    Update(DeclarationArgs),

    /// Delete the declared credential
    Delete(DeclarationArgs),

    /// Import an existing credential by id
    Import {
        /// Import id in the format [<folder>/]<domain>/<name>
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Look up an existing credential without managing it
    Lookup {
        /// Credential name
        #[arg(long)]
        name: String,

        /// Folder path, empty for the root
        #[arg(long, default_value = "")]
        folder: String,

        /// Credential domain
        #[arg(long, default_value = "_")]
        domain: String,
    },
}

#[derive(Args, Debug)]
pub struct DeclarationArgs {
    /// Declaration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Current resource id, overriding any id in the file
    #[arg(long)]
    pub id: Option<String>,
}

/// Load a declaration file into resource state
pub fn load_declaration(path: &Path) -> Result<ResourceState> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration file: {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse declaration file: {}", path.display()))
    } else {
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse declaration file: {}", path.display()))
    }
}

fn load_state(args: &DeclarationArgs) -> Result<ResourceState> {
    let mut state = load_declaration(&args.file)?;
    if let Some(id) = &args.id {
        state.id = Some(id.clone());
    }
    Ok(state)
}

/// Handle credential commands against `store`
pub async fn handle_credential_command<S>(
    command: CredentialCommands,
    store: S,
    format: OutputFormat,
) -> Result<()>
where
    S: CredentialStore + Clone,
{
    let resource = AzureServicePrincipalResource::new(store.clone());

    match command {
        CredentialCommands::Create(args) => {
            let mut state = load_state(&args)?;
            resource.create(&mut state).await?;
            print_output(&state, format)?;
        }
        CredentialCommands::Read(args) => {
            let mut state = load_state(&args)?;
            resource.read(&mut state).await?;
            if !state.is_present() {
                eprintln!("Credential '{}' no longer exists", state.fields.name);
            }
            print_output(&state, format)?;
        }
        CredentialCommands::Update(args) => {
            let mut state = load_state(&args)?;
            resource.update(&mut state).await?;
            print_output(&state, format)?;
        }
        CredentialCommands::Delete(args) => {
            let mut state = load_state(&args)?;
            resource.delete(&mut state).await?;
            print_output(&state, format)?;
        }
        CredentialCommands::Import { id } => {
            let mut state = resource.import(&id)?;
            resource.read(&mut state).await?;
            if !state.is_present() {
                anyhow::bail!("Cannot import non-existent credential '{}'", id);
            }
            print_output(&state, format)?;
        }
        CredentialCommands::Lookup { name, folder, domain } => {
            let source = AzureServicePrincipalDataSource::new(store);
            let query =
                AzureServicePrincipalQuery::new(name).in_folder(folder).in_domain(domain);
            match source.read(&query).await? {
                Some(view) => print_output(&view, format)?,
                None => anyhow::bail!(
                    "Azure service principal credential '{}' not found",
                    query.name
                ),
            }
        }
    }

    Ok(())
}
