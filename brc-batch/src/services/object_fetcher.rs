//! Cache-aware object fetcher
//!
//! Ensures each key's object exists in the flat local cache directory,
//! downloading at most once. A file already present short-circuits the
//! request; existing files are never overwritten or deleted. Failures are
//! isolated per key and recorded, never propagated.

use crate::types::{DownloadResult, DownloadStatus, ObjectKey};
use crate::services::object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Downloads missing objects into a local cache directory
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
    cache_dir: PathBuf,
}

impl ObjectFetcher {
    /// Create a fetcher, creating `cache_dir` if it does not exist yet
    pub fn new(
        store: Arc<dyn ObjectStore>,
        cache_dir: impl Into<PathBuf>,
    ) -> std::io::Result<ObjectFetcher> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(ObjectFetcher { store, cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure `key`'s object exists locally. One attempt per run, no
    /// integrity check against the remote: a cached file wins on bare
    /// existence.
    pub async fn fetch(&self, key: &ObjectKey) -> DownloadResult {
        let file_name = key.file_name();
        if file_name.is_empty() {
            return DownloadResult {
                key: key.clone(),
                local_path: self.cache_dir.clone(),
                status: DownloadStatus::Failed("key has no file name".to_string()),
            };
        }

        let local_path = self.cache_dir.join(file_name);
        if local_path.exists() {
            debug!("Cache hit: {} -> {}", key, local_path.display());
            return DownloadResult {
                key: key.clone(),
                local_path,
                status: DownloadStatus::AlreadyPresent,
            };
        }

        let status = match self.store.get(key).await {
            Ok(bytes) => match tokio::fs::write(&local_path, &bytes).await {
                Ok(()) => {
                    debug!("Downloaded: {} -> {}", key, local_path.display());
                    DownloadStatus::Downloaded
                }
                Err(e) => {
                    warn!("Write failed for {}: {}", key, e);
                    DownloadStatus::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!("Download failed for {}: {}", key, e);
                DownloadStatus::Failed(e.to_string())
            }
        };

        DownloadResult {
            key: key.clone(),
            local_path,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::object_store::StoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MemoryStore {
        objects: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StoreError> {
            self.objects
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| StoreError::NotFound(key.to_string()))
        }
    }

    fn fetcher_with(objects: &[(&str, &str)]) -> (ObjectFetcher, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore {
            objects: objects
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                .collect(),
        };
        let fetcher = ObjectFetcher::new(Arc::new(store), dir.path().join("cache")).unwrap();
        (fetcher, dir)
    }

    #[tokio::test]
    async fn test_download_then_cache_hit() {
        let (fetcher, _dir) = fetcher_with(&[("orders/123.json", "{}")]);
        let key = ObjectKey::new("orders/123.json").unwrap();

        let first = fetcher.fetch(&key).await;
        assert_eq!(first.status, DownloadStatus::Downloaded);
        assert_eq!(first.local_path, fetcher.cache_dir().join("123.json"));
        assert_eq!(std::fs::read_to_string(&first.local_path).unwrap(), "{}");

        let second = fetcher.fetch(&key).await;
        assert_eq!(second.status, DownloadStatus::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_missing_object_is_isolated_failure() {
        let (fetcher, _dir) = fetcher_with(&[]);
        let key = ObjectKey::new("orders/404.json").unwrap();

        let result = fetcher.fetch(&key).await;
        assert!(matches!(result.status, DownloadStatus::Failed(_)));
        assert!(!result.local_path.exists());
    }

    #[tokio::test]
    async fn test_existing_file_is_never_overwritten() {
        let (fetcher, _dir) = fetcher_with(&[("orders/123.json", "remote")]);
        let key = ObjectKey::new("orders/123.json").unwrap();

        let local_path = fetcher.cache_dir().join("123.json");
        std::fs::write(&local_path, "local").unwrap();

        let result = fetcher.fetch(&key).await;
        assert_eq!(result.status, DownloadStatus::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&local_path).unwrap(), "local");
    }

    #[tokio::test]
    async fn test_key_without_file_name_fails() {
        let (fetcher, _dir) = fetcher_with(&[]);
        let key = ObjectKey::new("orders/").unwrap();

        let result = fetcher.fetch(&key).await;
        assert!(matches!(result.status, DownloadStatus::Failed(_)));
    }

    #[tokio::test]
    async fn test_keys_with_paths_land_flat() {
        let (fetcher, _dir) = fetcher_with(&[("a/b/c/9.json", "x")]);
        let key = ObjectKey::new("a/b/c/9.json").unwrap();

        let result = fetcher.fetch(&key).await;
        assert_eq!(result.status, DownloadStatus::Downloaded);
        assert_eq!(result.local_path, fetcher.cache_dir().join("9.json"));
    }
}
