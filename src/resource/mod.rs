//! Declarative resources backed by the credential store.
//!
//! - [`azure_service_principal`]: lifecycle of one Azure service principal
//!   credential (create, read, update, delete, import)
//! - [`data_source`]: read-only lookup of an existing credential
//! - [`folder`]: folder existence gate used before creation

pub mod azure_service_principal;
pub mod data_source;
pub mod folder;

pub use azure_service_principal::{
    AzureServicePrincipalFields, AzureServicePrincipalResource, ResourceState,
};
pub use data_source::{
    AzureServicePrincipalDataSource, AzureServicePrincipalQuery, AzureServicePrincipalView,
};
pub use folder::ensure_folder_exists;

pub(crate) const CREATE_CONTEXT: &str = "Could not create Azure service principal credentials";
pub(crate) const READ_CONTEXT: &str = "Could not read Azure service principal credentials";
pub(crate) const UPDATE_CONTEXT: &str = "Could not update Azure service principal credentials";
pub(crate) const DELETE_CONTEXT: &str = "Could not delete Azure service principal credentials";
