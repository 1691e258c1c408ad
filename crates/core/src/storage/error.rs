//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Listing a prefix failed.
    #[error("Failed to list s3://{bucket}/{prefix}: {reason}")]
    ListFailed {
        bucket: String,
        prefix: String,
        reason: String,
    },

    /// The object does not exist.
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Fetching an object failed.
    #[error("Failed to download s3://{bucket}/{key}: {reason}")]
    DownloadFailed {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Publishing an object failed.
    #[error("Failed to upload {path} to s3://{bucket}/{key}: {reason}")]
    UploadFailed {
        path: PathBuf,
        bucket: String,
        key: String,
        reason: String,
    },

    /// Local file I/O failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Creates a download failed error.
    pub fn download_failed(bucket: &str, key: &str, reason: impl Into<String>) -> Self {
        Self::DownloadFailed {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an upload failed error.
    pub fn upload_failed(
        path: impl Into<PathBuf>,
        bucket: &str,
        key: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::UploadFailed {
            path: path.into(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a local I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
