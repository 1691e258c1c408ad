//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageError;
use super::types::ObjectEntry;

/// Object storage the batch drivers fetch from and publish to.
///
/// Calls are not retried by implementations.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Lists every object under `prefix`, following pagination to the end.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError>;

    /// Downloads an object to `local_path`, returning the bytes written.
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<u64, StorageError>;

    /// Uploads `local_path` as an object, returning the bytes sent.
    ///
    /// `acl` is a canned ACL such as `bucket-owner-full-control`.
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        acl: Option<&str>,
    ) -> Result<u64, StorageError>;
}
