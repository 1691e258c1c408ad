//! Configuration for the batch drivers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings shared by the listing and event-driven drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Root under which each work item gets its own staging directory.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Drop the first folder of the source key when mirroring it under the
    /// destination prefix (batch operations events only).
    #[serde(default = "default_trim_leading_folder")]
    pub trim_leading_folder: bool,
}

fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join("copcify")
}

fn default_trim_leading_folder() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            trim_leading_folder: default_trim_leading_folder(),
        }
    }
}

impl BatchConfig {
    /// Sets the staging root.
    pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = staging_dir.into();
        self
    }

    /// Sets whether the leading folder is trimmed.
    pub fn with_trim_leading_folder(mut self, trim: bool) -> Self {
        self.trim_leading_folder = trim;
        self
    }
}
