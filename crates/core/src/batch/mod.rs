//! Batch module: remote conversion over object storage.
//!
//! Each remote item goes through the same sequence: create a unique staging
//! directory, download the source object, convert it with the shared
//! [`FileConverter`](crate::conversion::FileConverter), upload the output and
//! remove the staging directory. Failures are captured per item and
//! classified as temporary (transport) or permanent (input or engine).
//!
//! [`BatchDriver`] exposes the three entry points: a listing run over the
//! configured source prefix, an S3 Batch Operations event and a direct event
//! naming one object.

mod config;
mod driver;
mod error;
mod events;
mod staging;
mod types;

pub use config::BatchConfig;
pub use driver::BatchDriver;
pub use error::{BatchError, ItemError};
pub use events::{
    BatchJob, BatchOperationsEvent, BatchOperationsResponse, BatchTask, DirectEvent,
    DirectEventResponse, TaskResult,
};
pub use staging::StagingArea;
pub use types::{BatchSummary, ResultCode, ResultRecord, WorkItem};
