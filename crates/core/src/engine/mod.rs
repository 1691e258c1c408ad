//! Engine module for running point-cloud transform jobs.
//!
//! This module provides the `Engine` trait and the PDAL-backed implementation
//! that turns LAS/LAZ input into Cloud-Optimized Point Cloud output.
//!
//! Two submission modes are supported by [`PdalEngine`]:
//!
//! - `file`: the job is written to a temporary file next to the input and run
//!   with `pdal pipeline <file>`. The file is removed on every exit path.
//! - `stdin`: the job is piped to `pdal pipeline --stdin`, and the written file
//!   is summarized afterwards to report its point count.
//!
//! # Example
//!
//! ```ignore
//! use copcify_core::engine::{Engine, EngineConfig, PdalEngine, TransformJob};
//!
//! let engine = PdalEngine::new(EngineConfig::default());
//! let info = engine.validate().await?;
//! println!("PDAL {}", info.version);
//!
//! let job = TransformJob::new("/data/terrain.las", "/data/terrain.copc.laz");
//! let outcome = engine.execute(&job).await?;
//! ```

mod config;
mod error;
mod pdal;
mod traits;
mod types;

pub use config::{EngineConfig, JobSubmission};
pub use error::EngineError;
pub use pdal::PdalEngine;
pub use traits::Engine;
pub use types::{EngineInfo, EngineOutcome, TransformJob, COPC_WRITER};
