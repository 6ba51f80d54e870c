//! Store snapshot persistence.
//!
//! The CLI keeps its local state in a single JSON file: the snapshot
//! is loaded into a [`MemoryStore`] before a command runs and written
//! back afterwards. A missing file means an empty store, not an error.

use std::path::Path;

use tracing::debug;

use teamdir_store::{MemoryStore, StoreSnapshot};

use crate::error::{CliError, CliResult};

/// Load the store from `path`, or start empty when the file does not
/// exist yet.
pub async fn load_store(path: &Path) -> CliResult<MemoryStore> {
    match tokio::fs::read(path).await {
        Ok(raw) => {
            let snapshot: StoreSnapshot = serde_json::from_slice(&raw).map_err(|err| {
                CliError::Io(format!("corrupt store snapshot {}: {err}", path.display()))
            })?;
            debug!(
                path = %path.display(),
                principals = snapshot.principals.len(),
                teams = snapshot.teams.len(),
                "loaded store snapshot"
            );
            Ok(MemoryStore::from_snapshot(snapshot))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no store snapshot yet, starting empty");
            Ok(MemoryStore::new())
        }
        Err(err) => Err(CliError::Io(format!(
            "cannot read store snapshot {}: {err}",
            path.display()
        ))),
    }
}

/// Write the store back to `path`.
pub async fn save_store(path: &Path, store: &MemoryStore) -> CliResult<()> {
    let snapshot = store.snapshot();
    let raw = serde_json::to_vec_pretty(&snapshot)
        .map_err(|err| CliError::Io(format!("cannot serialize store snapshot: {err}")))?;
    tokio::fs::write(path, raw).await.map_err(|err| {
        CliError::Io(format!(
            "cannot write store snapshot {}: {err}",
            path.display()
        ))
    })?;
    debug!(path = %path.display(), "saved store snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamdir_store::{Principal, PrincipalStore};

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_store(&dir.path().join("missing.json")).await.unwrap();
        assert!(store.snapshot().principals.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::new();
        store
            .insert_principal(Principal::new("alice"))
            .await
            .unwrap();
        save_store(&path, &store).await.unwrap();

        let restored = load_store(&path).await.unwrap();
        assert!(restored
            .principal_by_username("alice")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = load_store(&path).await.unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
