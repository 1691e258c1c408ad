//! Single-file conversion orchestrator.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::engine::{Engine, TransformJob};
use crate::metrics;

use super::error::ConversionError;
use super::naming::{default_output_path, is_point_cloud};

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Input point cloud.
    pub input_path: PathBuf,
    /// Written COPC file.
    pub output_path: PathBuf,
    /// Points processed, when the engine reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_count: Option<u64>,
    /// Size of the written file.
    pub output_size_bytes: u64,
    /// Total time spent converting.
    pub duration_ms: u64,
}

impl ConversionReport {
    /// Output size in mebibytes.
    pub fn output_size_mb(&self) -> f64 {
        self.output_size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Validates one input, runs it through the engine and reports the outcome.
pub struct FileConverter<E: Engine> {
    engine: Arc<E>,
}

impl<E: Engine> Clone for FileConverter<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: Engine> FileConverter<E> {
    /// Creates a converter that owns the engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// The engine jobs are submitted to.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Converts `input`, logging the outcome. Never fails: every error is
    /// logged and reported as `false`.
    pub async fn convert(&self, input: &Path, output: Option<&Path>) -> bool {
        match self.run(input, output).await {
            Ok(report) => {
                match report.point_count {
                    Some(count) => info!(
                        "Processed {} points. COPC output: {}",
                        count,
                        report.output_path.display()
                    ),
                    None => info!(
                        "Successfully converted to {}",
                        report.output_path.display()
                    ),
                }
                info!("Output file size: {:.2} MB", report.output_size_mb());
                true
            }
            Err(e) => {
                log_failure(&e);
                false
            }
        }
    }

    /// Converts `input` and returns a report or the reason it failed.
    ///
    /// Validation happens before anything touches the filesystem. When
    /// `output` is omitted it defaults to `<stem>.copc.laz` next to the input.
    pub async fn run(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<ConversionReport, ConversionError> {
        validate_input(input)?;

        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        if output_path == input {
            return Err(ConversionError::OutputIsInput { path: output_path });
        }

        info!(
            engine = self.engine.name(),
            "Converting {} to {}",
            input.display(),
            output_path.display()
        );

        let job = TransformJob::new(input, &output_path);
        let start = Instant::now();
        let result = self.engine.execute(&job).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::record_conversion(false, elapsed.as_secs_f64(), None);
                return Err(e.into());
            }
        };

        let output_meta = match tokio::fs::metadata(&output_path).await {
            Ok(meta) => meta,
            Err(_) => {
                metrics::record_conversion(false, elapsed.as_secs_f64(), None);
                return Err(ConversionError::OutputMissing { path: output_path });
            }
        };

        metrics::record_conversion(true, elapsed.as_secs_f64(), outcome.point_count);

        Ok(ConversionReport {
            input_path: input.to_path_buf(),
            output_path,
            point_count: outcome.point_count,
            output_size_bytes: output_meta.len(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}

/// Rejects inputs that do not exist or are not LAS/LAZ.
pub fn validate_input(input: &Path) -> Result<(), ConversionError> {
    if !input.exists() {
        return Err(ConversionError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if !is_point_cloud(input) {
        return Err(ConversionError::UnsupportedExtension {
            path: input.to_path_buf(),
        });
    }

    Ok(())
}

pub(crate) fn log_failure(e: &ConversionError) {
    match e {
        ConversionError::Engine(engine_err) => {
            error!("Conversion failed: {}", engine_err);
            if let Some(stderr) = engine_err.diagnostics() {
                error!("Error: {}", stderr);
            }
        }
        other => error!("ERROR: {}", other),
    }
}
