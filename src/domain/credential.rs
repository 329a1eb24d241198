//! Azure service principal credential entity and its store payload.
//!
//! Jenkins stores this credential as an XML document whose root element is
//! the Azure Credentials plugin class:
//!
//! ```xml
//! <com.microsoft.azure.util.AzureCredentials>
//!   <id>sp1</id>
//!   <scope>GLOBAL</scope>
//!   <description/>
//!   <data>
//!     <subscriptionId>sub-1</subscriptionId>
//!     <clientId>cid-1</clientId>
//!     <clientSecret>secret-1</clientSecret>
//!     <certificateId/>
//!     <tenant>ten-1</tenant>
//!     <azureEnvironmentName/>
//!     <serviceManagementURL/>
//!     <authenticationEndpoint/>
//!     <resourceManagerEndpoint/>
//!     <graphEndpoint/>
//!   </data>
//! </com.microsoft.azure.util.AzureCredentials>
//! ```
//!
//! `clientSecret` and `certificateId` are optional on the wire: leaving one
//! out of an update document tells the store to keep what it has.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::Error;
use crate::secrets::{serialize_exposed_opt, SecretString};
use crate::store::{StoreError, StoreResult};

/// Root element of the Azure credential document.
pub const AZURE_CREDENTIALS_CLASS: &str = "com.microsoft.azure.util.AzureCredentials";

/// Visibility of a credential inside Jenkins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CredentialScope {
    /// Available to jobs and the controller
    #[default]
    Global,
    /// Available to the controller only
    System,
}

impl CredentialScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "GLOBAL",
            Self::System => "SYSTEM",
        }
    }
}

impl FromStr for CredentialScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GLOBAL" => Ok(Self::Global),
            "SYSTEM" => Ok(Self::System),
            _ => Err(Error::validation_field(
                format!("invalid scope '{}', expected one of GLOBAL, SYSTEM", s),
                "scope",
            )),
        }
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Plain text in every format, so `<scope>GLOBAL</scope>` and `scope = "GLOBAL"`
// both round-trip.
impl Serialize for CredentialScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CredentialScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// An Azure service principal credential as stored in Jenkins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "com.microsoft.azure.util.AzureCredentials")]
pub struct AzureServicePrincipalCredential {
    pub id: String,
    #[serde(default)]
    pub scope: CredentialScope,
    #[serde(default)]
    pub description: String,
    pub data: AzureServicePrincipalData,
}

/// Service principal payload nested under `<data>`.
///
/// Only one of `client_secret` / `certificate_id` is meant to carry a value;
/// the declared-field layer enforces that before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureServicePrincipalData {
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_exposed_opt"
    )]
    pub client_secret: Option<SecretString>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_exposed_opt"
    )]
    pub certificate_id: Option<SecretString>,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub azure_environment_name: String,
    #[serde(default, rename = "serviceManagementURL")]
    pub service_management_url: String,
    #[serde(default)]
    pub authentication_endpoint: String,
    #[serde(default)]
    pub resource_manager_endpoint: String,
    #[serde(default)]
    pub graph_endpoint: String,
}

impl AzureServicePrincipalCredential {
    /// Encode into the XML document the store accepts.
    pub fn to_document(&self) -> StoreResult<CredentialDocument> {
        let xml = quick_xml::se::to_string(self).map_err(|e| {
            StoreError::serialization(format!("failed to encode credential '{}': {}", self.id, e))
        })?;
        Ok(CredentialDocument::new(xml))
    }

    /// Decode a document returned by the store.
    ///
    /// Missing optional elements decode as empty; unknown elements and
    /// attributes (such as the `plugin` version marker) are ignored.
    pub fn from_document(document: &CredentialDocument) -> StoreResult<Self> {
        quick_xml::de::from_str(document.as_str()).map_err(|e| {
            StoreError::serialization(format!("failed to decode credential document: {}", e))
        })
    }

    /// Whether this credential carries a non-empty client secret.
    pub fn has_client_secret(&self) -> bool {
        self.data.client_secret.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Whether this credential carries a non-empty certificate reference.
    pub fn has_certificate(&self) -> bool {
        self.data.certificate_id.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Serialized credential payload exchanged with a store.
///
/// Debug output never includes the body, which may hold a secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDocument(String);

impl CredentialDocument {
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CredentialDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialDocument([{} bytes XML])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AzureServicePrincipalCredential {
        AzureServicePrincipalCredential {
            id: "sp1".to_string(),
            scope: CredentialScope::Global,
            description: "deploys".to_string(),
            data: AzureServicePrincipalData {
                subscription_id: "sub-1".to_string(),
                client_id: "cid-1".to_string(),
                client_secret: Some(SecretString::new("secret-1")),
                certificate_id: None,
                tenant: "ten-1".to_string(),
                service_management_url: "https://management.core.windows.net/".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn scope_parses_only_known_values() {
        assert_eq!("GLOBAL".parse::<CredentialScope>().unwrap(), CredentialScope::Global);
        assert_eq!("SYSTEM".parse::<CredentialScope>().unwrap(), CredentialScope::System);
        assert!("global".parse::<CredentialScope>().is_err());
        assert!("USER".parse::<CredentialScope>().is_err());
        assert_eq!(CredentialScope::default(), CredentialScope::Global);
    }

    #[test]
    fn document_uses_plugin_element_names() {
        let xml = sample().to_document().unwrap().into_string();
        assert!(xml.starts_with(&format!("<{}>", AZURE_CREDENTIALS_CLASS)));
        assert!(xml.contains("<id>sp1</id>"));
        assert!(xml.contains("<scope>GLOBAL</scope>"));
        assert!(xml.contains("<subscriptionId>sub-1</subscriptionId>"));
        assert!(xml.contains("<clientSecret>secret-1</clientSecret>"));
        assert!(xml.contains("<serviceManagementURL>https://management.core.windows.net/</serviceManagementURL>"));
        assert!(!xml.contains("certificateId"));
    }

    #[test]
    fn document_decodes_store_response() {
        let document = CredentialDocument::new(
            r#"<com.microsoft.azure.util.AzureCredentials plugin="azure-credentials@254.v64da_8176c83a">
  <scope>SYSTEM</scope>
  <id>sp1</id>
  <description>from jenkins</description>
  <data>
    <subscriptionId>sub-1</subscriptionId>
    <clientId>cid-1</clientId>
    <clientSecret>{AQAAABAAAAAQmasked=}</clientSecret>
    <tenant>ten-1</tenant>
    <azureEnvironmentName>Azure</azureEnvironmentName>
  </data>
</com.microsoft.azure.util.AzureCredentials>"#,
        );

        let credential = AzureServicePrincipalCredential::from_document(&document).unwrap();
        assert_eq!(credential.id, "sp1");
        assert_eq!(credential.scope, CredentialScope::System);
        assert_eq!(credential.description, "from jenkins");
        assert_eq!(credential.data.tenant, "ten-1");
        assert_eq!(credential.data.azure_environment_name, "Azure");
        assert_eq!(credential.data.graph_endpoint, "");
        assert!(credential.has_client_secret());
        assert!(!credential.has_certificate());
    }

    #[test]
    fn malformed_document_is_a_serialization_error() {
        let err = AzureServicePrincipalCredential::from_document(&CredentialDocument::new("<nope"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credential = sample();
        assert!(!format!("{:?}", credential).contains("secret-1"));

        let document = credential.to_document().unwrap();
        let rendered = format!("{:?}", document);
        assert!(rendered.starts_with("CredentialDocument(["));
        assert!(!rendered.contains("secret-1"));
    }
}
