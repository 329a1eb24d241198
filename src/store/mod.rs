//! Remote credential store abstraction.
//!
//! The lifecycle controller never talks HTTP directly. It drives a
//! [`CredentialStore`], which addresses one credential by its normalized
//! folder, its domain and its id, and exchanges serialized
//! [`CredentialDocument`]s. Two implementations ship with the crate:
//!
//! - [`JenkinsCredentialStore`]: the Jenkins credentials plugin REST API
//! - [`InMemoryCredentialStore`]: an in-process store with Jenkins-like
//!   semantics (masked secrets, 404s, folder tree) that records every call
//!
//! Cancellation is by dropping the returned future; no implementation retries.

pub mod error;
pub mod jenkins;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use jenkins::JenkinsCredentialStore;
pub use memory::{InMemoryCredentialStore, StoreCall, MASKED_SECRET};

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::CredentialDocument;

/// Capability interface for the remote credential store.
///
/// `folder` is always the normalized folder path (`teamA/sub`, or `""` for
/// the root), never the store's URL form.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log document contents
/// - Secrets read back from a store are not authoritative
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a credential in `domain` under `folder`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the folder or domain does not exist
    /// - [`StoreError::Http`] for any other rejection (duplicate id, permissions)
    async fn add(&self, folder: &str, domain: &str, document: &CredentialDocument)
        -> StoreResult<()>;

    /// Fetch a single credential document.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the credential does not exist
    async fn get_single(&self, folder: &str, domain: &str, id: &str)
        -> StoreResult<CredentialDocument>;

    /// Replace an existing credential with `document`.
    ///
    /// Callers leave out the secret elements they do not mean to change. The
    /// Jenkins store posts the document as given; the in-memory store keeps
    /// its stored secret for any element that is missing.
    async fn update(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()>;

    /// Delete a credential.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the credential is already gone
    async fn delete(&self, folder: &str, domain: &str, id: &str) -> StoreResult<()>;

    /// Check that a folder exists. The root folder (`""`) always exists.
    async fn folder_exists(&self, folder: &str) -> StoreResult<()>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn add(
        &self,
        folder: &str,
        domain: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        (**self).add(folder, domain, document).await
    }

    async fn get_single(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
    ) -> StoreResult<CredentialDocument> {
        (**self).get_single(folder, domain, id).await
    }

    async fn update(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        (**self).update(folder, domain, id, document).await
    }

    async fn delete(&self, folder: &str, domain: &str, id: &str) -> StoreResult<()> {
        (**self).delete(folder, domain, id).await
    }

    async fn folder_exists(&self, folder: &str) -> StoreResult<()> {
        (**self).folder_exists(folder).await
    }
}
