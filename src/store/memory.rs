//! In-process credential store.
//!
//! Behaves like a Jenkins controller as far as the lifecycle controller can
//! tell: folders must exist before credentials are added to them, ids are
//! unique per folder and domain, client secrets come back masked, and an
//! update that omits a secret keeps the stored one. Every call is recorded so
//! tests can assert what was sent.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{StoreError, StoreResult};
use super::CredentialStore;
use crate::domain::{normalize_folder, AzureServicePrincipalCredential, CredentialDocument};
use crate::secrets::SecretString;

/// Stand-in for the encrypted value Jenkins echoes back instead of a secret.
pub const MASKED_SECRET: &str = "{AQAAABAAAAAQmaskedSecretValue=}";

type CredentialKey = (String, String, String);

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Add { folder: String, domain: String, id: String, secret_included: bool },
    GetSingle { folder: String, domain: String, id: String },
    Update {
        folder: String,
        domain: String,
        id: String,
        secret_included: bool,
        certificate_included: bool,
    },
    Delete { folder: String, domain: String, id: String },
    FolderExists { folder: String },
}

#[derive(Debug, Default)]
struct State {
    folders: BTreeSet<String>,
    credentials: BTreeMap<CredentialKey, AzureServicePrincipalCredential>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreError>,
}

/// [`CredentialStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    state: Mutex<State>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_folder`](Self::add_folder).
    pub fn with_folder(self, folder: &str) -> Self {
        self.add_folder(folder);
        self
    }

    /// Register a folder and all of its ancestors.
    pub fn add_folder(&self, folder: &str) {
        let folder = normalize_folder(folder);
        let mut state = self.lock();
        let mut path = String::new();
        for segment in folder.split('/').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);
            state.folders.insert(path.clone());
        }
    }

    /// Seed a credential without recording a call. Registers the folder.
    pub fn insert(&self, folder: &str, domain: &str, credential: AzureServicePrincipalCredential) {
        self.add_folder(folder);
        let key = (normalize_folder(folder), domain.to_string(), credential.id.clone());
        self.lock().credentials.insert(key, credential);
    }

    /// The credential as stored, secrets unmasked.
    pub fn stored(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
    ) -> Option<AzureServicePrincipalCredential> {
        self.lock().credentials.get(&key(&normalize_folder(folder), domain, id)).cloned()
    }

    /// Remove a credential behind the controller's back.
    pub fn remove(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
    ) -> Option<AzureServicePrincipalCredential> {
        self.lock().credentials.remove(&key(&normalize_folder(folder), domain, id))
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Make the next store call fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_next = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call` and consume any injected failure.
    fn begin(&self, call: StoreCall) -> StoreResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        let failure = state.fail_next.take();
        match failure {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn key(folder: &str, domain: &str, id: &str) -> CredentialKey {
    (folder.to_string(), domain.to_string(), id.to_string())
}

fn present(secret: &Option<SecretString>) -> bool {
    secret.as_ref().is_some_and(|s| !s.is_empty())
}

fn decode(document: &CredentialDocument) -> StoreResult<AzureServicePrincipalCredential> {
    AzureServicePrincipalCredential::from_document(document)
}

fn folder_known(state: &State, folder: &str) -> bool {
    folder.is_empty() || state.folders.contains(folder)
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn add(
        &self,
        folder: &str,
        domain: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        let credential = decode(document)?;
        let mut state = self.begin(StoreCall::Add {
            folder: folder.to_string(),
            domain: domain.to_string(),
            id: credential.id.clone(),
            secret_included: present(&credential.data.client_secret),
        })?;

        if !folder_known(&state, folder) {
            return Err(StoreError::not_found(format!("folder '{}'", folder)));
        }

        let key = key(folder, domain, &credential.id);
        if state.credentials.contains_key(&key) {
            return Err(StoreError::http(
                409,
                format!("A credential with id '{}' already exists", credential.id),
            ));
        }

        state.credentials.insert(key, credential);
        Ok(())
    }

    async fn get_single(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
    ) -> StoreResult<CredentialDocument> {
        let state = self.begin(StoreCall::GetSingle {
            folder: folder.to_string(),
            domain: domain.to_string(),
            id: id.to_string(),
        })?;

        let mut credential = state
            .credentials
            .get(&key(folder, domain, id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("credential '{}'", id)))?;
        drop(state);

        if present(&credential.data.client_secret) {
            credential.data.client_secret = Some(SecretString::new(MASKED_SECRET));
        }
        credential.to_document()
    }

    async fn update(
        &self,
        folder: &str,
        domain: &str,
        id: &str,
        document: &CredentialDocument,
    ) -> StoreResult<()> {
        let mut incoming = decode(document)?;
        let mut state = self.begin(StoreCall::Update {
            folder: folder.to_string(),
            domain: domain.to_string(),
            id: id.to_string(),
            secret_included: present(&incoming.data.client_secret),
            certificate_included: present(&incoming.data.certificate_id),
        })?;

        let existing = state
            .credentials
            .remove(&key(folder, domain, id))
            .ok_or_else(|| StoreError::not_found(format!("credential '{}'", id)))?;

        if !present(&incoming.data.client_secret) {
            incoming.data.client_secret = existing.data.client_secret;
        }
        if !present(&incoming.data.certificate_id) {
            incoming.data.certificate_id = existing.data.certificate_id;
        }

        state.credentials.insert(key(folder, domain, &incoming.id), incoming);
        Ok(())
    }

    async fn delete(&self, folder: &str, domain: &str, id: &str) -> StoreResult<()> {
        let mut state = self.begin(StoreCall::Delete {
            folder: folder.to_string(),
            domain: domain.to_string(),
            id: id.to_string(),
        })?;

        state
            .credentials
            .remove(&key(folder, domain, id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(format!("credential '{}'", id)))
    }

    async fn folder_exists(&self, folder: &str) -> StoreResult<()> {
        let state = self.begin(StoreCall::FolderExists { folder: folder.to_string() })?;

        if folder_known(&state, folder) {
            Ok(())
        } else {
            Err(StoreError::not_found(format!("folder '{}'", folder)))
        }
    }
}
