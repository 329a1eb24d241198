//! Domain types for Jenkins credentials.
//!
//! - [`coordinate`]: where a credential lives (folder, domain, id) and the
//!   identifiers derived from that
//! - [`credential`]: the Azure service principal entity and its store payload

pub mod coordinate;
pub mod credential;

pub use coordinate::{
    folder_api_path, normalize_folder, resource_id, CredentialCoordinate, DEFAULT_DOMAIN,
};
pub use credential::{
    AzureServicePrincipalCredential, AzureServicePrincipalData, CredentialDocument,
    CredentialScope, AZURE_CREDENTIALS_CLASS,
};
