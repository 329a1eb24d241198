//! Jenkins credentials plugin REST client.
//!
//! Every credential lives under a store URL built from its folder and domain:
//!
//! - root: `<server>/credentials/store/system/domain/<domain>`
//! - folder `teamA/sub`: `<server>/job/teamA/job/sub/credentials/store/folder/domain/<domain>`
//!
//! Payloads are XML documents posted with `Content-Type: application/xml`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use super::error::{StoreError, StoreResult};
use super::CredentialStore;
use crate::config::JenkinsConfig;
use crate::domain::{folder_api_path, CredentialDocument};
use crate::secrets::SecretString;

const XML_CONTENT_TYPE: &str = "application/xml";

/// Longest response body excerpt carried in an error message.
const MAX_ERROR_BODY: usize = 512;

/// [`CredentialStore`] backed by a Jenkins controller.
#[derive(Debug, Clone)]
pub struct JenkinsCredentialStore {
    client: Client,
    base_url: Url,
    username: Option<String>,
    api_token: Option<SecretString>,
}

impl JenkinsCredentialStore {
    /// Build a client from connection settings.
    pub fn new(config: &JenkinsConfig) -> StoreResult<Self> {
        let base_url = Url::parse(&config.server_url).map_err(|e| {
            StoreError::transport(format!("invalid Jenkins URL '{}': {}", config.server_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::transport(format!(
                "Jenkins URL '{}' cannot be used as a base URL",
                config.server_url
            )));
        }

        let mut builder = Client::builder().timeout(config.timeout());

        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                StoreError::transport(format!(
                    "failed to read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                StoreError::transport(format!("invalid CA certificate {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| StoreError::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Base URL of the Jenkins controller.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `segments` below `folder`, with every segment percent-encoded.
    fn folder_url(&self, folder: &str, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        let api_path = folder_api_path(folder);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(api_path.split('/').filter(|s| !s.is_empty()));
            path.extend(segments);
        }
        url
    }

    /// URL of the credential domain that holds `folder`'s credentials.
    fn domain_url(&self, folder: &str, domain: &str, segments: &[&str]) -> Url {
        let store = if folder.is_empty() { "system" } else { "folder" };
        let mut all = vec!["credentials", "store", store, "domain", domain];
        all.extend_from_slice(segments);
        self.folder_url(folder, &all)
    }

    fn credential_url(&self, folder: &str, domain: &str, id: &str, action: &str) -> Url {
        self.domain_url(folder, domain, &["credential", id, action])
    }

    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request
                .basic_auth(username, self.api_token.as_ref().map(|t| t.expose_secret().to_string())),
            None => request,
        }
    }

    fn get(&self, url: Url) -> RequestBuilder {
        debug!(method = "GET", url = %url, "Jenkins request");
        self.authenticated(self.client.get(url))
    }

    fn post_xml(&self, url: Url, document: Option<&CredentialDocument>) -> RequestBuilder {
        debug!(method = "POST", url = %url, "Jenkins request");
        let request = self.authenticated(self.client.post(url));
        match document {
            Some(document) => request
                .header(reqwest::header::CONTENT_TYPE, XML_CONTENT_TYPE)
                .body(document.as_str().to_string()),
            None => request,
        }
    }

    /// Send a request and classify the response status.
    async fn send(&self, request: RequestBuilder, resource: String) -> StoreResult<Response> {
        let response = request.send().await.map_err(StoreError::from)?;
        let status = response.status();
        debug!(status = status.as_u16(), resource = %resource, "Jenkins response");

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(resource));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match body.trim() {
                "" => status.canonical_reason().unwrap_or("request failed").to_string(),
                text => text.chars().take(MAX_ERROR_BODY).collect(),
            };
            return Err(StoreError::http(status.as_u16(), message));
        }

        Ok(response)
    }
}

fn describe(folder: &str, domain: &str, id: &str) -> String {
    if folder.is_empty() {
        format!("credential '{}' in domain '{}'", id, domain)
    } else {
        format!("credential '{}' in domain '{}' of folder '{}'", id, domain, folder)
    }
}

#[async_trait]
impl CredentialStore for JenkinsCredentialStore {
    async fn add(
        &self,
        folder: &str,
        domain: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        let url = self.domain_url(folder, domain, &["createCredentials"]);
        let resource = format!("credential domain '{}' of folder '{}'", domain, folder);
        self.send(self.post_xml(url, Some(document)), resource).await?;
        Ok(())
    }

    async fn get_single(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
    ) -> StoreResult<CredentialDocument> {
        let url = self.credential_url(folder, domain, id, "config.xml");
        let response = self.send(self.get(url), describe(folder, domain, id)).await?;
        let body = response.text().await.map_err(StoreError::from)?;
        Ok(CredentialDocument::new(body))
    }

    async fn update(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        let url = self.credential_url(folder, domain, id, "config.xml");
        self.send(self.post_xml(url, Some(document)), describe(folder, domain, id)).await?;
        Ok(())
    }

    async fn delete(&self, folder: &str, domain: &str, id: &str) -> StoreResult<()> {
        let url = self.credential_url(folder, domain, id, "doDelete");
        self.send(self.post_xml(url, None), describe(folder, domain, id)).await?;
        Ok(())
    }

    async fn folder_exists(&self, folder: &str) -> StoreResult<()> {
        if folder.is_empty() {
            return Ok(());
        }

        let url = self.folder_url(folder, &["api", "json"]);
        self.send(self.get(url), format!("folder '{}'", folder)).await?;
        Ok(())
    }
}
