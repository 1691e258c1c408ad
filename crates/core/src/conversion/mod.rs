//! Conversion module: validate one LAS/LAZ input and turn it into COPC.
//!
//! [`FileConverter`] is the orchestrator every deployment variant shares. It
//! checks the input, derives the default output name, builds the single-stage
//! transform job and hands it to an [`Engine`](crate::engine::Engine).
//!
//! The default output rule is the same everywhere: the input extension is
//! replaced by `.copc.laz`, so `terrain.las` becomes `terrain.copc.laz`.

mod converter;
mod error;
pub mod naming;

pub use converter::{validate_input, ConversionReport, FileConverter};
pub(crate) use converter::log_failure;
pub use error::ConversionError;
pub use naming::{default_output_name, default_output_path, is_point_cloud};
