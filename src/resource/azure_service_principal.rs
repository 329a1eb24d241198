//! Lifecycle of an Azure service principal credential.
//!
//! [`AzureServicePrincipalResource`] reconciles a declared
//! [`ResourceState`] against the credential store:
//!
//! | Operation | Store calls | Resulting `id` |
//! |-----------|-------------|----------------|
//! | create    | folder check, add, get | `folder/name`, or cleared if the read finds nothing |
//! | read      | get | `folder/name`, cleared on not-found |
//! | update    | update, get | `folder/name`, or cleared if the read finds nothing |
//! | delete    | delete | cleared |
//! | import    | none | `folder/name` |
//!
//! A read never copies secrets back from the store. Jenkins answers with an
//! encrypted placeholder instead of the real value, so only `description`,
//! `scope`, `subscription_id`, `client_id` and `tenant` are refreshed.

use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use validator::Validate;

use super::folder::ensure_folder_exists;
use super::{CREATE_CONTEXT, DELETE_CONTEXT, READ_CONTEXT, UPDATE_CONTEXT};
use crate::credential_span;
use crate::domain::{
    resource_id, AzureServicePrincipalCredential, AzureServicePrincipalData, CredentialCoordinate,
    CredentialScope, DEFAULT_DOMAIN,
};
use crate::errors::{Error, Result};
use crate::secrets::SecretString;
use crate::store::CredentialStore;

/// Declared fields of an Azure service principal credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AzureServicePrincipalFields {
    /// Credential id, unique within its folder and domain
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    /// Folder path, empty for the root
    pub folder: String,

    /// Credential domain
    pub domain: String,

    pub scope: CredentialScope,

    pub description: String,

    pub subscription_id: String,

    pub client_id: String,

    /// Write-only: never refreshed from the store and never printed, so
    /// printed state fed back as a declaration keeps the stored secret
    #[serde(skip_serializing)]
    pub client_secret: SecretString,

    /// Write-only, like `client_secret`
    #[serde(alias = "certificate_id", skip_serializing)]
    pub client_certificate: SecretString,

    pub tenant: String,

    pub azure_environment_name: String,

    pub service_management_url: String,

    pub authentication_endpoint: String,

    pub resource_manager_endpoint: String,

    pub graph_endpoint: String,
}

impl Default for AzureServicePrincipalFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            folder: String::new(),
            domain: DEFAULT_DOMAIN.to_string(),
            scope: CredentialScope::default(),
            description: String::new(),
            subscription_id: String::new(),
            client_id: String::new(),
            client_secret: SecretString::default(),
            client_certificate: SecretString::default(),
            tenant: String::new(),
            azure_environment_name: String::new(),
            service_management_url: String::new(),
            authentication_endpoint: String::new(),
            resource_manager_endpoint: String::new(),
            graph_endpoint: String::new(),
        }
    }
}

impl AzureServicePrincipalFields {
    /// Coordinate addressed by these fields.
    pub fn coordinate(&self) -> Result<CredentialCoordinate> {
        CredentialCoordinate::new(&self.folder, &self.domain, &self.name)
    }

    /// Check the fields a new credential needs.
    ///
    /// Exactly one of `client_secret` and `client_certificate` must be set.
    pub fn validate_for_create(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        let missing: Vec<&str> = [
            ("subscription_id", &self.subscription_id),
            ("client_id", &self.client_id),
            ("tenant", &self.tenant),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

        match missing.as_slice() {
            [] => {}
            [field] => {
                return Err(Error::validation_field(format!("{} is required", field), *field))
            }
            fields => {
                return Err(Error::validation(format!("{} are required", fields.join(", "))))
            }
        }

        match (self.client_secret.is_empty(), self.client_certificate.is_empty()) {
            (false, false) => Err(Self::both_secrets_error()),
            (true, true) => Err(Error::validation(
                "one of client_secret or client_certificate is required",
            )),
            _ => Ok(()),
        }
    }

    /// Check the fields of an update. Leaving both secrets empty keeps the
    /// stored ones.
    pub fn validate_for_update(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        if !self.client_secret.is_empty() && !self.client_certificate.is_empty() {
            return Err(Self::both_secrets_error());
        }
        Ok(())
    }

    fn both_secrets_error() -> Error {
        Error::validation("client_secret and client_certificate are mutually exclusive; set only one")
    }

    /// Credential for an add call. Every field is sent, empty or not.
    pub fn to_credential(&self) -> AzureServicePrincipalCredential {
        self.build_credential(
            Some(self.client_secret.clone()),
            Some(self.client_certificate.clone()),
        )
    }

    /// Credential for an update call. Empty secrets are left out so the
    /// store keeps what it has.
    pub fn to_update_credential(&self) -> AzureServicePrincipalCredential {
        self.build_credential(self.client_secret.non_empty(), self.client_certificate.non_empty())
    }

    fn build_credential(
        &self,
        client_secret: Option<SecretString>,
        certificate_id: Option<SecretString>,
    ) -> AzureServicePrincipalCredential {
        AzureServicePrincipalCredential {
            id: self.name.clone(),
            scope: self.scope,
            description: self.description.clone(),
            data: AzureServicePrincipalData {
                subscription_id: self.subscription_id.clone(),
                client_id: self.client_id.clone(),
                client_secret,
                certificate_id,
                tenant: self.tenant.clone(),
                azure_environment_name: self.azure_environment_name.clone(),
                service_management_url: self.service_management_url.clone(),
                authentication_endpoint: self.authentication_endpoint.clone(),
                resource_manager_endpoint: self.resource_manager_endpoint.clone(),
                graph_endpoint: self.graph_endpoint.clone(),
            },
        }
    }

    /// Refresh the non-secret fields from a credential read from the store.
    pub fn apply_remote(&mut self, credential: &AzureServicePrincipalCredential) {
        self.description = credential.description.clone();
        self.scope = credential.scope;
        self.subscription_id = credential.data.subscription_id.clone();
        self.client_id = credential.data.client_id.clone();
        self.tenant = credential.data.tenant.clone();
    }
}

/// Declared fields plus the identity of the remote object.
///
/// `id == None` means the credential is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: AzureServicePrincipalFields,
}

impl ResourceState {
    pub fn new(fields: AzureServicePrincipalFields) -> Self {
        Self { id: None, fields }
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }
}

/// Lifecycle controller for Azure service principal credentials.
#[derive(Debug, Clone)]
pub struct AzureServicePrincipalResource<S> {
    store: S,
}

impl<S: CredentialStore> AzureServicePrincipalResource<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the declared credential, then read it back.
    ///
    /// Fails without calling `add` when the folder does not exist.
    pub async fn create(&self, state: &mut ResourceState) -> Result<()> {
        state.fields.validate_for_create()?;
        let coordinate = state.fields.coordinate()?;
        let span = credential_span!(
            "create",
            coordinate.folder(),
            coordinate.domain(),
            coordinate.name()
        );

        async {
            ensure_folder_exists(&self.store, coordinate.folder()).await?;

            let document = state
                .fields
                .to_credential()
                .to_document()
                .map_err(|e| Error::remote(CREATE_CONTEXT, e))?;
            self.store
                .add(coordinate.folder(), coordinate.domain(), &document)
                .await
                .map_err(|e| Error::remote(CREATE_CONTEXT, e))?;

            state.id = Some(coordinate.resource_id());
            info!(resource_id = %coordinate.resource_id(), "Created Azure service principal credential");

            self.read(state).await
        }
        .instrument(span)
        .await
    }

    /// Refresh state from the store.
    ///
    /// A credential the store no longer has clears `id` and is not an error.
    /// Any other failure leaves `id` untouched.
    pub async fn read(&self, state: &mut ResourceState) -> Result<()> {
        let coordinate = state.fields.coordinate()?;
        let span =
            credential_span!("read", coordinate.folder(), coordinate.domain(), coordinate.name());

        async {
            let document = match self
                .store
                .get_single(coordinate.folder(), coordinate.domain(), coordinate.name())
                .await
            {
                Ok(document) => document,
                Err(e) if e.is_not_found() => {
                    warn!(
                        previous_id = ?state.id,
                        "Azure service principal credential not found, removing from state"
                    );
                    state.id = None;
                    return Ok(());
                }
                Err(e) => return Err(Error::remote(READ_CONTEXT, e)),
            };

            let credential = AzureServicePrincipalCredential::from_document(&document)
                .map_err(|e| Error::remote(READ_CONTEXT, e))?;

            state.fields.apply_remote(&credential);
            let id =
                if credential.id.is_empty() { coordinate.name() } else { credential.id.as_str() };
            state.id = Some(resource_id(coordinate.folder(), id));
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Push declared changes, then read the credential back.
    ///
    /// Empty secrets are not sent, so the stored ones stay in place.
    pub async fn update(&self, state: &mut ResourceState) -> Result<()> {
        state.fields.validate_for_update()?;
        let coordinate = state.fields.coordinate()?;
        let span =
            credential_span!("update", coordinate.folder(), coordinate.domain(), coordinate.name());

        async {
            let credential = state.fields.to_update_credential();
            let document = credential.to_document().map_err(|e| Error::remote(UPDATE_CONTEXT, e))?;
            self.store
                .update(coordinate.folder(), coordinate.domain(), coordinate.name(), &document)
                .await
                .map_err(|e| Error::remote(UPDATE_CONTEXT, e))?;

            state.id = Some(coordinate.resource_id());
            info!(
                resource_id = %coordinate.resource_id(),
                secret_rotated = credential.has_client_secret() || credential.has_certificate(),
                "Updated Azure service principal credential"
            );

            self.read(state).await
        }
        .instrument(span)
        .await
    }

    /// Delete the credential. A credential that is already gone is an error.
    pub async fn delete(&self, state: &mut ResourceState) -> Result<()> {
        let coordinate = state.fields.coordinate()?;
        let span =
            credential_span!("delete", coordinate.folder(), coordinate.domain(), coordinate.name());

        async {
            self.store
                .delete(coordinate.folder(), coordinate.domain(), coordinate.name())
                .await
                .map_err(|e| Error::remote(DELETE_CONTEXT, e))?;

            state.id = None;
            info!(resource_id = %coordinate.resource_id(), "Deleted Azure service principal credential");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Build state from an import id of the form `[<folder>/]<domain>/<name>`.
    ///
    /// Makes no store call; follow with [`read`](Self::read) to fill in the
    /// remaining fields.
    pub fn import(&self, raw: &str) -> Result<ResourceState> {
        let coordinate = CredentialCoordinate::parse(raw)?;

        let fields = AzureServicePrincipalFields {
            name: coordinate.name().to_string(),
            folder: coordinate.folder().to_string(),
            domain: coordinate.domain().to_string(),
            ..Default::default()
        };

        info!(
            import_id = %raw,
            resource_id = %coordinate.resource_id(),
            "Imported Azure service principal credential"
        );
        Ok(ResourceState { id: Some(coordinate.resource_id()), fields })
    }
}
