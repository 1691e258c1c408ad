//! Mock engine for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{Engine, EngineError, EngineInfo, EngineOutcome, TransformJob};

/// Bytes written to the output path by a successful mock run.
pub const MOCK_COPC_PAYLOAD: &[u8] = b"COPC mock output";

/// Mock implementation of the Engine trait.
///
/// Provides controllable behavior for testing:
/// - Track submitted jobs for assertions
/// - Simulate success or failure, once or per input file name
/// - Control the reported point count and version
///
/// # Example
///
/// ```rust,ignore
/// use copcify_core::testing::MockEngine;
///
/// let engine = MockEngine::new();
/// engine.set_point_count(1065).await;
/// engine.fail_on("broken.las").await;
///
/// let converter = FileConverter::new(engine.clone());
/// // ...
/// assert_eq!(engine.execution_count().await, 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Jobs submitted, in order.
    jobs: Arc<RwLock<Vec<TransformJob>>>,
    /// If set, the next execution fails with this error.
    next_error: Arc<RwLock<Option<EngineError>>>,
    /// Input file names that always fail.
    failing_inputs: Arc<RwLock<HashSet<String>>>,
    /// Point count reported on success.
    point_count: Arc<RwLock<Option<u64>>>,
    /// Whether a successful run writes the output file.
    write_output: Arc<RwLock<bool>>,
    /// Version reported by `validate`.
    version: Arc<RwLock<String>>,
    /// Simulate a missing installation.
    missing: Arc<RwLock<bool>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_inputs: Arc::new(RwLock::new(HashSet::new())),
            point_count: Arc::new(RwLock::new(Some(1000))),
            write_output: Arc::new(RwLock::new(true)),
            version: Arc::new(RwLock::new("2.6.3".to_string())),
            missing: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all submitted jobs.
    pub async fn recorded_jobs(&self) -> Vec<TransformJob> {
        self.jobs.read().await.clone()
    }

    /// Get the number of executions.
    pub async fn execution_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Configure the next execution to fail with the given error.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every job whose input file is named `file_name` fail.
    pub async fn fail_on(&self, file_name: &str) {
        self.failing_inputs
            .write()
            .await
            .insert(file_name.to_string());
    }

    pub async fn set_point_count(&self, count: u64) {
        *self.point_count.write().await = Some(count);
    }

    /// Succeed without writing anything to the output path.
    pub async fn set_write_output(&self, write: bool) {
        *self.write_output.write().await = write;
    }

    pub async fn set_version(&self, version: &str) {
        *self.version.write().await = version.to_string();
    }

    /// Report the engine as not installed.
    pub async fn set_missing(&self, missing: bool) {
        *self.missing.write().await = missing;
    }

    async fn take_error(&self) -> Option<EngineError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, job: &TransformJob) -> Result<EngineOutcome, EngineError> {
        self.jobs.write().await.push(job.clone());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let file_name = job
            .input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing_inputs.read().await.contains(&file_name) {
            return Err(EngineError::execution_failed(
                "pdal exited with code: Some(1)",
                Some(format!("readers.las: Unable to read {}", file_name)),
            ));
        }

        if *self.write_output.read().await {
            tokio::fs::write(&job.output_path, MOCK_COPC_PAYLOAD).await?;
        }

        Ok(EngineOutcome {
            point_count: *self.point_count.read().await,
            metadata: None,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<EngineInfo, EngineError> {
        if *self.missing.read().await {
            return Err(EngineError::ExecutableNotFound {
                path: "pdal".into(),
            });
        }
        Ok(EngineInfo {
            name: "mock".to_string(),
            version: self.version.read().await.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_writes_output_and_records_job() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        let job = TransformJob::new(dir.path().join("a.las"), dir.path().join("a.copc.laz"));

        let outcome = engine.execute(&job).await.unwrap();

        assert_eq!(outcome.point_count, Some(1000));
        assert_eq!(std::fs::read(&job.output_path).unwrap(), MOCK_COPC_PAYLOAD);
        assert_eq!(engine.recorded_jobs().await, vec![job]);
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        engine.set_next_error(EngineError::Timeout { timeout_secs: 5 }).await;
        let job = TransformJob::new(dir.path().join("a.las"), dir.path().join("a.copc.laz"));

        assert!(engine.execute(&job).await.is_err());
        assert!(engine.execute(&job).await.is_ok());
        assert_eq!(engine.execution_count().await, 2);
    }

    #[tokio::test]
    async fn test_fail_on_input_name() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        engine.fail_on("bad.las").await;

        let bad = TransformJob::new(dir.path().join("bad.las"), dir.path().join("bad.copc.laz"));
        let err = engine.execute(&bad).await.unwrap_err();
        assert!(err.diagnostics().unwrap().contains("bad.las"));
        assert!(!bad.output_path.exists());
    }

    #[tokio::test]
    async fn test_validate() {
        let engine = MockEngine::new();
        assert_eq!(engine.validate().await.unwrap().version, "2.6.3");

        engine.set_missing(true).await;
        assert!(engine.validate().await.unwrap_err().is_missing_engine());
    }
}
