//! Testing utilities and mock implementations.
//!
//! Mocks for the two external seams, the transform engine and the object
//! store, so the converter and the batch drivers can be exercised without
//! PDAL or S3.
//!
//! # Example
//!
//! ```rust,ignore
//! use copcify_core::testing::{MockEngine, MockObjectStore};
//!
//! let store = MockObjectStore::new();
//! store.put_object("raw", "incoming/terrain.las", b"LASF").await;
//!
//! let engine = MockEngine::new();
//! engine.set_point_count(1065).await;
//! ```

mod mock_engine;
mod mock_store;

pub use mock_engine::{MockEngine, MOCK_COPC_PAYLOAD};
pub use mock_store::{MockObjectStore, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::batch::{BatchOperationsEvent, BatchTask};

    /// A schema 1.0 batch operations task naming `bucket` by ARN.
    pub fn arn_task(task_id: &str, bucket: &str, key: &str) -> BatchTask {
        BatchTask {
            task_id: task_id.to_string(),
            s3_bucket_arn: Some(format!("arn:aws:s3:::{}", bucket)),
            s3_bucket: None,
            s3_key: key.to_string(),
            s3_version_id: None,
        }
    }

    /// A schema 2.0 batch operations task naming `bucket` directly.
    pub fn bucket_task(task_id: &str, bucket: &str, key: &str) -> BatchTask {
        BatchTask {
            task_id: task_id.to_string(),
            s3_bucket_arn: None,
            s3_bucket: Some(bucket.to_string()),
            s3_key: key.to_string(),
            s3_version_id: None,
        }
    }

    /// A batch operations event carrying `tasks`.
    pub fn batch_event(schema: &str, tasks: Vec<BatchTask>) -> BatchOperationsEvent {
        BatchOperationsEvent {
            invocation_id: "inv-test".to_string(),
            invocation_schema_version: schema.to_string(),
            job: None,
            tasks,
        }
    }
}
