//! # Jenkins Credentials
//!
//! Declarative lifecycle management for Azure service principal credentials
//! held by a Jenkins controller. A declared credential (its folder, domain,
//! name and service principal fields) is reconciled against the Jenkins
//! credential store through create, read, update, delete and import.
//!
//! ## Architecture
//!
//! ```text
//! CLI / embedder → Lifecycle Controller → Payload Codec → CredentialStore → Jenkins
//!                        ↓                                      ↓
//!                 Identifier Codec                     InMemoryCredentialStore
//! ```
//!
//! ## Core Components
//!
//! - **Identifier Codec** ([`domain::coordinate`]): `[<folder>/]<domain>/<name>` import ids
//!   and `folder/name` resource ids
//! - **Payload Codec** ([`domain::credential`]): the Azure Credentials plugin XML document
//! - **Credential Store** ([`store`]): Jenkins REST client and an in-memory double
//! - **Lifecycle Controller** ([`resource`]): reconciliation policy, including
//!   "not found on read is not an error" and "never re-read a secret"
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use jenkins_credentials::{
//!     AzureServicePrincipalFields, AzureServicePrincipalResource, JenkinsConfig,
//!     JenkinsCredentialStore, ResourceState,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JenkinsCredentialStore::new(&JenkinsConfig::default())?;
//! let resource = AzureServicePrincipalResource::new(store);
//!
//! let mut state = ResourceState::new(AzureServicePrincipalFields {
//!     name: "sp1".to_string(),
//!     folder: "teamA".to_string(),
//!     subscription_id: "sub-1".to_string(),
//!     client_id: "cid-1".to_string(),
//!     client_secret: "secret-1".into(),
//!     tenant: "ten-1".to_string(),
//!     ..Default::default()
//! });
//! resource.create(&mut state).await?;
//! assert_eq!(state.id.as_deref(), Some("teamA/sp1"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod resource;
pub mod secrets;
pub mod store;

// Re-export commonly used types and traits
pub use config::{Config, JenkinsConfig, LoggingConfig};
pub use domain::{
    AzureServicePrincipalCredential, AzureServicePrincipalData, CredentialCoordinate,
    CredentialScope,
};
pub use errors::{Error, Result};
pub use resource::{
    AzureServicePrincipalDataSource, AzureServicePrincipalFields, AzureServicePrincipalResource,
    ResourceState,
};
pub use secrets::SecretString;
pub use store::{CredentialStore, InMemoryCredentialStore, JenkinsCredentialStore, StoreError};
