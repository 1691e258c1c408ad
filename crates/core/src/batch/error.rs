//! Error types for the batch module.

use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::ConversionError;
use crate::storage::StorageError;

use super::types::ResultCode;

/// Why a single work item failed.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Creating the per-item staging directory failed.
    #[error("Failed to create staging directory {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task or key cannot be turned into a work item.
    #[error("Invalid work item: {0}")]
    InvalidItem(String),
}

impl ItemError {
    /// Classifies the failure for the result record.
    ///
    /// Transport and local disk problems are retryable; anything about the
    /// input itself is not.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Conversion(_) => ResultCode::PermanentFailure,
            Self::Storage(StorageError::NotFound { .. }) => ResultCode::PermanentFailure,
            Self::Storage(_) => ResultCode::TemporaryFailure,
            Self::Staging { .. } => ResultCode::TemporaryFailure,
            Self::InvalidItem(_) => ResultCode::PermanentFailure,
        }
    }
}

/// Errors that abort a whole listing-driven run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No source bucket configured for listing")]
    SourceNotConfigured,

    #[error(transparent)]
    Listing(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    #[test]
    fn test_result_code_mapping() {
        let transport = ItemError::Storage(StorageError::download_failed("raw", "a.laz", "reset"));
        assert_eq!(transport.result_code(), ResultCode::TemporaryFailure);

        let missing = ItemError::Storage(StorageError::NotFound {
            bucket: "raw".to_string(),
            key: "a.laz".to_string(),
        });
        assert_eq!(missing.result_code(), ResultCode::PermanentFailure);

        let engine = ItemError::Conversion(ConversionError::Engine(EngineError::execution_failed(
            "pdal exited with code: Some(1)",
            None,
        )));
        assert_eq!(engine.result_code(), ResultCode::PermanentFailure);

        let invalid = ItemError::InvalidItem("empty key".to_string());
        assert_eq!(invalid.result_code(), ResultCode::PermanentFailure);
    }
}
