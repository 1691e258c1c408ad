//! Configuration for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a transform job is handed to the PDAL executable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSubmission {
    /// Write the job to a temporary file and run `pdal pipeline <file>`.
    #[default]
    File,
    /// Pipe the job to `pdal pipeline --stdin` and summarize the output afterwards.
    Stdin,
}

/// Configuration for the PDAL engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the pdal binary.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Job submission mode.
    #[serde(default)]
    pub submission: JobSubmission,

    /// Timeout for a single pipeline in seconds. Unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_executable() -> PathBuf {
    PathBuf::from("pdal")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            submission: JobSubmission::default(),
            timeout_secs: None,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with a custom pdal path.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    /// Sets the submission mode.
    pub fn with_submission(mut self, submission: JobSubmission) -> Self {
        self.submission = submission;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}
