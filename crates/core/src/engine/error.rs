//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a transform job.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine executable not found.
    #[error("PDAL not found at path: {path}")]
    ExecutableNotFound { path: PathBuf },

    /// The engine ran but reported a failure.
    #[error("Pipeline execution failed: {reason}")]
    ExecutionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The engine did not finish within the configured timeout.
    #[error("Pipeline timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The transform job could not be serialized.
    #[error("Failed to serialize transform job: {0}")]
    InvalidJob(#[from] serde_json::Error),

    /// Engine output could not be interpreted.
    #[error("Failed to parse engine output: {reason}")]
    ParseError { reason: String },

    /// I/O error while talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a new execution failed error with captured stderr.
    pub fn execution_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExecutionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new parse error.
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Diagnostic text emitted by the engine, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }

    /// Whether the engine itself is unavailable on this system.
    pub fn is_missing_engine(&self) -> bool {
        matches!(self, Self::ExecutableNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_keeps_stderr() {
        let err = EngineError::execution_failed(
            "pdal exited with code: Some(1)",
            Some("PDAL: readers.las: Invalid file signature".to_string()),
        );
        assert_eq!(
            err.diagnostics(),
            Some("PDAL: readers.las: Invalid file signature")
        );
        assert!(err.to_string().contains("exited with code"));
    }

    #[test]
    fn test_missing_engine() {
        let err = EngineError::ExecutableNotFound {
            path: PathBuf::from("pdal"),
        };
        assert!(err.is_missing_engine());
        assert!(err.diagnostics().is_none());
        assert!(!EngineError::Timeout { timeout_secs: 5 }.is_missing_engine());
    }
}
