use crate::counts::PlayCountStore;
use crate::errors::AppError;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::error;

#[derive(Debug, Error)]
pub enum CountsLoadError {
    #[error("counts file not found")]
    NotFound,
    #[error("failed to read counts file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse counts file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub async fn load_counts(path: &Path) -> Result<PlayCountStore, CountsLoadError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(CountsLoadError::NotFound);
        }
        Err(err) => return Err(err.into()),
    };
    Ok(PlayCountStore::parse(&bytes)?)
}

/// Startup load; the counts file is a cache of remote data, so failures start empty.
pub async fn load_counts_or_default(path: &Path) -> PlayCountStore {
    match load_counts(path).await {
        Ok(store) => store,
        Err(CountsLoadError::NotFound) => PlayCountStore::default(),
        Err(err) => {
            error!("{err}");
            PlayCountStore::default()
        }
    }
}

pub async fn persist_counts(path: &Path, store: &mut PlayCountStore) -> Result<(), AppError> {
    let payload = store.serialize().map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    store.mark_clean();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_key::DateKey;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_is_reported_then_defaults_empty() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("playcounts.json");

        assert!(matches!(load_counts(&path).await, Err(CountsLoadError::NotFound)));
        assert!(load_counts_or_default(&path).await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_distinguished_from_missing() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("playcounts.json");
        std::fs::write(&path, "{\"2024-03-05\": \"many\"}").unwrap();

        assert!(matches!(load_counts(&path).await, Err(CountsLoadError::Parse(_))));
        assert!(load_counts_or_default(&path).await.is_empty());
    }

    #[tokio::test]
    async fn local_play_survives_restart() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("playcounts.json");
        let key = DateKey::parse("2024-03-05").unwrap();

        let mut store = load_counts_or_default(&path).await;
        assert!(store.is_empty());
        store.increment(key.clone(), 1);
        assert_eq!(store.count_for(&key), 1);

        persist_counts(&path, &mut store).await.expect("persist");
        assert!(!store.is_dirty());

        let reloaded = load_counts(&path).await.expect("reload");
        assert_eq!(reloaded.count_for(&key), 1);
        assert_eq!(reloaded, store);
    }
}
