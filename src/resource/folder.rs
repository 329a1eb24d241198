//! Folder existence gate.

use tracing::debug;

use crate::domain::normalize_folder;
use crate::errors::{Error, Result};
use crate::store::CredentialStore;

/// Check that `folder` exists in the store.
///
/// The root folder always exists and costs no store call. A missing folder
/// is reported as [`Error::FolderNotFound`]; any other store failure as
/// [`Error::Remote`].
pub async fn ensure_folder_exists<S>(store: &S, folder: &str) -> Result<()>
where
    S: CredentialStore + ?Sized,
{
    let folder = normalize_folder(folder);
    if folder.is_empty() {
        return Ok(());
    }

    debug!(folder = %folder, "Checking folder exists");
    match store.folder_exists(&folder).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_not_found() => Err(Error::folder_not_found(folder, e)),
        Err(e) => Err(Error::remote(format!("Could not look up folder '{}'", folder), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCredentialStore, StoreCall, StoreError};

    #[tokio::test]
    async fn test_root_needs_no_lookup() {
        let store = InMemoryCredentialStore::new();
        ensure_folder_exists(&store, "").await.unwrap();
        ensure_folder_exists(&store, "/").await.unwrap();
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_folder_is_normalized() {
        let store = InMemoryCredentialStore::new().with_folder("teamA/sub");
        ensure_folder_exists(&store, "/teamA//sub/").await.unwrap();
        assert_eq!(store.calls(), vec![StoreCall::FolderExists { folder: "teamA/sub".to_string() }]);
    }

    #[tokio::test]
    async fn test_missing_folder() {
        let store = InMemoryCredentialStore::new();
        let err = ensure_folder_exists(&store, "ghost").await.unwrap_err();
        assert!(matches!(err, Error::FolderNotFound { ref folder, .. } if folder == "ghost"));
        assert!(err.to_string().starts_with("invalid folder name 'ghost' specified: "));
    }

    #[tokio::test]
    async fn test_other_failures_are_remote_errors() {
        let store = InMemoryCredentialStore::new();
        store.fail_next(StoreError::http(403, "forbidden"));
        let err = ensure_folder_exists(&store, "teamA").await.unwrap_err();
        assert!(matches!(err, Error::Remote { .. }));
    }
}
