//! Read-only lookup of an existing Azure service principal credential.
//!
//! Unlike the managed resource, a lookup never owns the credential: it
//! reports what the store holds and nothing about its secrets.

use serde::{Deserialize, Serialize};
use tracing::{debug, Instrument};
use validator::Validate;

use super::READ_CONTEXT;
use crate::credential_span;
use crate::domain::{
    AzureServicePrincipalCredential, CredentialCoordinate, CredentialScope, DEFAULT_DOMAIN,
};
use crate::errors::{Error, Result};
use crate::store::CredentialStore;

/// Which credential to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AzureServicePrincipalQuery {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub folder: String,
    pub domain: String,
}

impl Default for AzureServicePrincipalQuery {
    fn default() -> Self {
        Self { name: String::new(), folder: String::new(), domain: DEFAULT_DOMAIN.to_string() }
    }
}

impl AzureServicePrincipalQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }
}

/// Non-secret view of a stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AzureServicePrincipalView {
    pub id: String,
    pub name: String,
    pub folder: String,
    pub domain: String,
    pub scope: CredentialScope,
    pub description: String,
    pub subscription_id: String,
    pub client_id: String,
    pub tenant: String,
}

impl AzureServicePrincipalView {
    fn from_credential(
        coordinate: &CredentialCoordinate,
        credential: AzureServicePrincipalCredential,
    ) -> Self {
        Self {
            id: coordinate.resource_id(),
            name: coordinate.name().to_string(),
            folder: coordinate.folder().to_string(),
            domain: coordinate.domain().to_string(),
            scope: credential.scope,
            description: credential.description,
            subscription_id: credential.data.subscription_id,
            client_id: credential.data.client_id,
            tenant: credential.data.tenant,
        }
    }
}

/// Looks up credentials without managing them.
#[derive(Debug, Clone)]
pub struct AzureServicePrincipalDataSource<S> {
    store: S,
}

impl<S: CredentialStore> AzureServicePrincipalDataSource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the credential named by `query`; `Ok(None)` when it does not exist.
    pub async fn read(
        &self,
        query: &AzureServicePrincipalQuery,
    ) -> Result<Option<AzureServicePrincipalView>> {
        Validate::validate(query).map_err(Error::from)?;
        let coordinate = CredentialCoordinate::new(&query.folder, &query.domain, &query.name)?;
        let span =
            credential_span!("lookup", coordinate.folder(), coordinate.domain(), coordinate.name());

        async {
            let document = match self
                .store
                .get_single(coordinate.folder(), coordinate.domain(), coordinate.name())
                .await
            {
                Ok(document) => document,
                Err(e) if e.is_not_found() => {
                    debug!("Azure service principal credential not found");
                    return Ok(None);
                }
                Err(e) => return Err(Error::remote(READ_CONTEXT, e)),
            };

            let credential = AzureServicePrincipalCredential::from_document(&document)
                .map_err(|e| Error::remote(READ_CONTEXT, e))?;
            Ok(Some(AzureServicePrincipalView::from_credential(&coordinate, credential)))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AzureServicePrincipalData;
    use crate::store::{InMemoryCredentialStore, StoreError};

    fn seeded() -> InMemoryCredentialStore {
        let store = InMemoryCredentialStore::new();
        store.insert(
            "teamA",
            "_",
            AzureServicePrincipalCredential {
                id: "sp1".to_string(),
                scope: CredentialScope::System,
                description: "deployer".to_string(),
                data: AzureServicePrincipalData {
                    subscription_id: "sub-1".to_string(),
                    client_id: "cid-1".to_string(),
                    client_secret: Some("secret-1".into()),
                    tenant: "ten-1".to_string(),
                    ..Default::default()
                },
            },
        );
        store
    }

    #[tokio::test]
    async fn test_lookup_returns_view() {
        let source = AzureServicePrincipalDataSource::new(seeded());
        let view = source
            .read(&AzureServicePrincipalQuery::new("sp1").in_folder("/teamA/"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.id, "teamA/sp1");
        assert_eq!(view.folder, "teamA");
        assert_eq!(view.domain, "_");
        assert_eq!(view.scope, CredentialScope::System);
        assert_eq!(view.description, "deployer");
        assert_eq!(view.tenant, "ten-1");

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("AQAAAB"));
    }

    #[tokio::test]
    async fn test_lookup_missing_is_none() {
        let source = AzureServicePrincipalDataSource::new(seeded());
        let view = source
            .read(&AzureServicePrincipalQuery::new("sp2").in_folder("teamA"))
            .await
            .unwrap();
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let source = AzureServicePrincipalDataSource::new(seeded());

        let err = source.read(&AzureServicePrincipalQuery::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        source.store.fail_next(StoreError::http(500, "boom"));
        let err = source.read(&AzureServicePrincipalQuery::new("sp1")).await.unwrap_err();
        assert!(err.to_string().starts_with(READ_CONTEXT));
    }
}
