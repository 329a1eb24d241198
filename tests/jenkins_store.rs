//! HTTP contract of the Jenkins credential store, checked against wiremock.

use anyhow::Result;
use jenkins_credentials::domain::{AzureServicePrincipalCredential, CredentialDocument};
use jenkins_credentials::{
    AzureServicePrincipalFields, AzureServicePrincipalResource, CredentialScope, CredentialStore,
    JenkinsConfig, JenkinsCredentialStore, ResourceState, StoreError,
};
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL_XML: &str = r#"<com.microsoft.azure.util.AzureCredentials plugin="azure-credentials@254.v64da_8176c83a">
  <scope>GLOBAL</scope>
  <id>sp1</id>
  <description>deployer</description>
  <data>
    <subscriptionId>sub-1</subscriptionId>
    <clientId>cid-1</clientId>
    <clientSecret>{AQAAABAAAAAQ3ZHkLf0Aa+masked=}</clientSecret>
    <certificateId></certificateId>
    <tenant>ten-1</tenant>
    <azureEnvironmentName>Azure</azureEnvironmentName>
    <serviceManagementURL></serviceManagementURL>
    <authenticationEndpoint></authenticationEndpoint>
    <resourceManagerEndpoint></resourceManagerEndpoint>
    <graphEndpoint></graphEndpoint>
  </data>
</com.microsoft.azure.util.AzureCredentials>"#;

fn store_for(server: &MockServer) -> JenkinsCredentialStore {
    let config = JenkinsConfig {
        server_url: server.uri(),
        username: Some("robot".to_string()),
        api_token: Some("tok".into()),
        timeout_seconds: 5,
        ..Default::default()
    };
    JenkinsCredentialStore::new(&config).unwrap()
}

fn declared() -> AzureServicePrincipalFields {
    AzureServicePrincipalFields {
        name: "sp1".to_string(),
        folder: "teamA".to_string(),
        subscription_id: "sub-1".to_string(),
        client_id: "cid-1".to_string(),
        client_secret: "secret-1".into(),
        tenant: "ten-1".to_string(),
        ..Default::default()
    }
}

fn xml_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/xml")
}

#[tokio::test]
async fn add_posts_xml_to_folder_store() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("POST"))
        .and(path("/job/teamA/credentials/store/folder/domain/_/createCredentials"))
        .and(basic_auth("robot", "tok"))
        .and(header("content-type", "application/xml"))
        .and(body_string_contains("<com.microsoft.azure.util.AzureCredentials>"))
        .and(body_string_contains("<clientSecret>secret-1</clientSecret>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let document = declared().to_credential().to_document()?;
    store.add("teamA", "_", &document).await?;

    Ok(())
}

#[tokio::test]
async fn get_single_decodes_credential() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("GET"))
        .and(path("/job/a/job/b/credentials/store/folder/domain/prod/credential/sp1/config.xml"))
        .respond_with(xml_response(CREDENTIAL_XML))
        .mount(&server)
        .await;

    let document = store.get_single("a/b", "prod", "sp1").await?;
    let credential = AzureServicePrincipalCredential::from_document(&document)?;

    assert_eq!(credential.id, "sp1");
    assert_eq!(credential.scope, CredentialScope::Global);
    assert_eq!(credential.description, "deployer");
    assert_eq!(credential.data.tenant, "ten-1");
    assert_eq!(credential.data.azure_environment_name, "Azure");

    Ok(())
}

#[tokio::test]
async fn missing_credential_is_not_found() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("GET"))
        .and(path("/credentials/store/system/domain/_/credential/ghost/config.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store.get_single("", "_", "ghost").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().ends_with("not found (404)"));

    Ok(())
}

#[tokio::test]
async fn other_statuses_are_http_errors() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("POST"))
        .and(path("/credentials/store/system/domain/_/credential/sp1/config.xml"))
        .respond_with(ResponseTemplate::new(403).set_body_string("No valid crumb was included"))
        .mount(&server)
        .await;

    let document = CredentialDocument::new("<x/>");
    let err = store.update("", "_", "sp1", &document).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Http { status: 403, message: "No valid crumb was included".to_string() }
    );

    Ok(())
}

#[tokio::test]
async fn delete_posts_do_delete() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("POST"))
        .and(path("/credentials/store/system/domain/_/credential/sp1/doDelete"))
        .and(basic_auth("robot", "tok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    store.delete("", "_", "sp1").await?;

    Ok(())
}

#[tokio::test]
async fn folder_lookup_uses_job_api() -> Result<()> {
    let server = MockServer::start().await;
    let store = store_for(&server);

    Mock::given(method("GET"))
        .and(path("/job/teamA/job/sub/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    store.folder_exists("teamA/sub").await?;
    assert!(store.folder_exists("ghost").await.unwrap_err().is_not_found());

    store.folder_exists("").await?;
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2, "root lookup must not reach the server");

    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = JenkinsConfig {
        server_url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 2,
        ..Default::default()
    };
    let store = JenkinsCredentialStore::new(&config).unwrap();

    let err = store.get_single("", "_", "sp1").await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

#[tokio::test]
async fn create_then_read_through_jenkins() -> Result<()> {
    let server = MockServer::start().await;
    let resource = AzureServicePrincipalResource::new(store_for(&server));

    Mock::given(method("GET"))
        .and(path("/job/teamA/api/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/job/teamA/credentials/store/folder/domain/_/createCredentials"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/teamA/credentials/store/folder/domain/_/credential/sp1/config.xml"))
        .respond_with(xml_response(CREDENTIAL_XML))
        .mount(&server)
        .await;

    let mut state = ResourceState::new(declared());
    resource.create(&mut state).await?;

    assert_eq!(state.id.as_deref(), Some("teamA/sp1"));
    assert_eq!(state.fields.description, "deployer");
    assert_eq!(state.fields.client_secret.expose_secret(), "secret-1");

    Ok(())
}

#[tokio::test]
async fn missing_folder_blocks_create() -> Result<()> {
    let server = MockServer::start().await;
    let resource = AzureServicePrincipalResource::new(store_for(&server));

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut state = ResourceState::new(declared());
    let err = resource.create(&mut state).await.unwrap_err();

    assert!(err.to_string().starts_with("invalid folder name 'teamA' specified"));
    assert!(state.id.is_none());

    Ok(())
}

#[tokio::test]
async fn update_without_secret_omits_secret_elements() -> Result<()> {
    let server = MockServer::start().await;
    let resource = AzureServicePrincipalResource::new(store_for(&server));

    Mock::given(method("POST"))
        .and(path("/job/teamA/credentials/store/folder/domain/_/credential/sp1/config.xml"))
        .and(header("content-type", "application/xml"))
        .and(body_string_contains("<tenant>ten-2</tenant>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/job/teamA/credentials/store/folder/domain/_/credential/sp1/config.xml"))
        .respond_with(xml_response(CREDENTIAL_XML))
        .mount(&server)
        .await;

    let mut fields = declared();
    fields.client_secret = Default::default();
    fields.tenant = "ten-2".to_string();
    let mut state = ResourceState { id: Some("teamA/sp1".to_string()), fields };
    resource.update(&mut state).await?;

    let requests = server.received_requests().await.unwrap_or_default();
    let posted = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .unwrap_or_default();
    assert!(posted.contains("<clientId>cid-1</clientId>"));
    assert!(!posted.contains("clientSecret"));
    assert!(!posted.contains("certificateId"));
    assert!(state.fields.client_secret.is_empty());

    Ok(())
}
