//! Types for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// PDAL stage that writes Cloud-Optimized Point Cloud output.
pub const COPC_WRITER: &str = "writers.copc";

/// A single-stage transform: read one point cloud, write it as COPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformJob {
    /// Point cloud to read. The reader is inferred from the extension.
    pub input_path: PathBuf,
    /// COPC file to write.
    pub output_path: PathBuf,
    /// Forward all readable header metadata to the writer.
    pub forward_all_metadata: bool,
}

/// Writer stage of the serialized pipeline.
#[derive(Debug, Serialize)]
struct WriterStage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    filename: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    forward: Option<&'static str>,
}

/// Serialized pipeline document understood by `pdal pipeline`.
#[derive(Debug, Serialize)]
struct PipelineDocument<'a> {
    pipeline: (String, WriterStage<'a>),
}

impl TransformJob {
    /// Creates a COPC transform that forwards all metadata.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            forward_all_metadata: true,
        }
    }

    /// Serializes the job as a compact pipeline document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let output = self.output_path.to_string_lossy();
        serde_json::to_string(&self.document(&output))
    }

    /// Serializes the job as an indented pipeline document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let output = self.output_path.to_string_lossy();
        serde_json::to_string_pretty(&self.document(&output))
    }

    fn document<'a>(&self, output: &'a str) -> PipelineDocument<'a> {
        PipelineDocument {
            pipeline: (
                self.input_path.to_string_lossy().into_owned(),
                WriterStage {
                    kind: COPC_WRITER,
                    filename: output,
                    forward: self.forward_all_metadata.then_some("all"),
                },
            ),
        }
    }
}

/// What the engine reports after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutcome {
    /// Number of points written, when the engine reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<u64>,
    /// Post-execution metadata, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Wall-clock time spent in the engine.
    pub duration_ms: u64,
}

/// Identification of an engine installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    /// Engine implementation name.
    pub name: String,
    /// Reported version string.
    pub version: String,
}
