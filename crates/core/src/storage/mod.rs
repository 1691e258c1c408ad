//! Storage module: object storage the batch drivers read from and write to.
//!
//! The [`ObjectStore`] trait covers the three calls the pipeline needs
//! (`list`, `download`, `upload`). [`S3ObjectStore`] implements it with the
//! AWS SDK; listings follow continuation tokens until exhausted and large
//! uploads switch to multipart.

mod config;
mod error;
mod s3;
mod traits;
mod types;

pub use config::{StorageConfig, BUCKET_OWNER_FULL_CONTROL};
pub use error::StorageError;
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;
pub use types::{ObjectEntry, ObjectLocation, PrefixLocation};
