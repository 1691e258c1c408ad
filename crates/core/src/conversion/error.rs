//! Error types for the conversion module.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;

/// Errors that can occur while converting a single file.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Input file does not exist.
    #[error("Input file {path} not found")]
    InputNotFound { path: PathBuf },

    /// Input is not a LAS/LAZ file.
    #[error("Input file must be .las or .laz format: {path}")]
    UnsupportedExtension { path: PathBuf },

    /// Output would overwrite the input.
    #[error("Output path is the same as the input: {path}")]
    OutputIsInput { path: PathBuf },

    /// The engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine reported success but wrote nothing.
    #[error("Engine reported success but no output was written to {path}")]
    OutputMissing { path: PathBuf },
}

impl ConversionError {
    /// Whether the input was rejected before the engine was invoked.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound { .. } | Self::UnsupportedExtension { .. } | Self::OutputIsInput { .. }
        )
    }
}
