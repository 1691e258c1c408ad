//! Trait definitions for the engine module.

use async_trait::async_trait;

use super::error::EngineError;
use super::types::{EngineInfo, EngineOutcome, TransformJob};

/// A point-cloud engine that can execute a COPC transform job.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Executes the job. Any engine-side failure is returned as an error;
    /// callers treat it as terminal for the item.
    async fn execute(&self, job: &TransformJob) -> Result<EngineOutcome, EngineError>;

    /// Checks that the engine is installed and reports its version.
    async fn validate(&self) -> Result<EngineInfo, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct StaticEngine;

    #[async_trait]
    impl Engine for StaticEngine {
        fn name(&self) -> &str {
            "static"
        }

        async fn execute(&self, _job: &TransformJob) -> Result<EngineOutcome, EngineError> {
            Ok(EngineOutcome {
                point_count: Some(42),
                metadata: None,
                duration_ms: 5,
            })
        }

        async fn validate(&self) -> Result<EngineInfo, EngineError> {
            Ok(EngineInfo {
                name: "static".to_string(),
                version: "0.0.1".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_engine_as_trait_object() {
        let engine: Arc<dyn Engine> = Arc::new(StaticEngine);
        let job = TransformJob::new("/in/a.las", "/in/a.copc.laz");

        let outcome = engine.execute(&job).await.unwrap();
        assert_eq!(outcome.point_count, Some(42));

        let info = engine.validate().await.unwrap();
        assert_eq!(info.version, "0.0.1");
        assert_eq!(engine.name(), "static");
    }
}
