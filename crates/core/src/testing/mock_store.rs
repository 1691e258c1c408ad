//! Mock object store for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{ObjectEntry, ObjectLocation, ObjectStore, StorageError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub location: ObjectLocation,
    pub local_path: PathBuf,
    pub acl: Option<String>,
    pub size: u64,
}

/// In-memory implementation of the ObjectStore trait.
///
/// Objects live in a map keyed by bucket and key. Listings are returned in
/// key order, the same order S3 uses. Failures can be injected for a list
/// call or for individual keys.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<RwLock<BTreeMap<(String, String), Vec<u8>>>>,
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    downloads: Arc<RwLock<Vec<ObjectLocation>>>,
    /// Keys whose download fails with a transport error.
    failing_downloads: Arc<RwLock<HashSet<String>>>,
    /// Keys whose upload fails with a transport error.
    failing_uploads: Arc<RwLock<HashSet<String>>>,
    /// If set, every listing fails with this reason.
    list_error: Arc<RwLock<Option<String>>>,
}

impl MockObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object.
    pub async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    /// Contents of an object, if present.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    pub async fn recorded_downloads(&self) -> Vec<ObjectLocation> {
        self.downloads.read().await.clone()
    }

    /// Make downloads of `key` fail with a transport error.
    pub async fn fail_download(&self, key: &str) {
        self.failing_downloads.write().await.insert(key.to_string());
    }

    /// Make uploads to `key` fail with a transport error.
    pub async fn fail_upload(&self, key: &str) {
        self.failing_uploads.write().await.insert(key.to_string());
    }

    /// Make every listing fail.
    pub async fn fail_list(&self, reason: &str) {
        *self.list_error.write().await = Some(reason.to_string());
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        if let Some(reason) = self.list_error.read().await.clone() {
            return Err(StorageError::ListFailed {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                reason,
            });
        }

        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|((b, key), _)| b == bucket && key.starts_with(prefix))
            .map(|((_, key), data)| ObjectEntry {
                key: key.clone(),
                size: Some(data.len() as u64),
                last_modified: None,
            })
            .collect())
    }

    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<u64, StorageError> {
        self.downloads
            .write()
            .await
            .push(ObjectLocation::new(bucket, key));

        if self.failing_downloads.read().await.contains(key) {
            return Err(StorageError::download_failed(
                bucket,
                key,
                "connection reset by peer",
            ));
        }

        let data = self
            .object(bucket, key)
            .await
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        tokio::fs::write(local_path, &data)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;
        Ok(data.len() as u64)
    }

    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        acl: Option<&str>,
    ) -> Result<u64, StorageError> {
        if self.failing_uploads.read().await.contains(key) {
            return Err(StorageError::upload_failed(
                local_path,
                bucket,
                key,
                "service unavailable",
            ));
        }

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::io(local_path, e))?;
        let size = data.len() as u64;

        self.put_object(bucket, key, &data).await;
        self.uploads.write().await.push(RecordedUpload {
            location: ObjectLocation::new(bucket, key),
            local_path: local_path.to_path_buf(),
            acl: acl.map(str::to_string),
            size,
        });
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_filters_by_bucket_and_prefix() {
        let store = MockObjectStore::new();
        store.put_object("raw", "incoming/b.laz", b"b").await;
        store.put_object("raw", "incoming/a.las", b"a").await;
        store.put_object("raw", "other/c.las", b"c").await;
        store.put_object("converted", "incoming/d.las", b"d").await;

        let keys: Vec<String> = store
            .list("raw", "incoming/")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, vec!["incoming/a.las", "incoming/b.laz"]);
    }

    #[tokio::test]
    async fn test_download_and_upload() {
        let dir = TempDir::new().unwrap();
        let store = MockObjectStore::new();
        store.put_object("raw", "a.las", b"LASF").await;

        let local = dir.path().join("a.las");
        assert_eq!(store.download("raw", "a.las", &local).await.unwrap(), 4);

        let size = store
            .upload(&local, "converted", "a.copc.laz", Some("private"))
            .await
            .unwrap();
        assert_eq!(size, 4);
        assert_eq!(store.object("converted", "a.copc.laz").await.unwrap(), b"LASF");
        assert_eq!(store.recorded_uploads().await[0].acl.as_deref(), Some("private"));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let dir = TempDir::new().unwrap();
        let store = MockObjectStore::new();
        let result = store.download("raw", "nope.las", &dir.path().join("x")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }
}
