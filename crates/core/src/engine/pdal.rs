//! PDAL command-line engine implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::{EngineConfig, JobSubmission};
use super::error::EngineError;
use super::traits::Engine;
use super::types::{EngineInfo, EngineOutcome, TransformJob};

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pdal\s+(\d+\.\d+(?:\.\d+)?[^\s]*)").unwrap());

/// Engine backed by the `pdal` executable.
pub struct PdalEngine {
    config: EngineConfig,
}

impl PdalEngine {
    /// Creates a new PDAL engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> EngineError {
        if e.kind() == std::io::ErrorKind::NotFound {
            EngineError::ExecutableNotFound {
                path: self.config.executable.clone(),
            }
        } else {
            EngineError::Io(e)
        }
    }

    /// Waits for the child, killing it if the configured timeout expires.
    async fn wait(&self, child: Child) -> Result<Output, EngineError> {
        match self.config.timeout_secs {
            Some(secs) => match timeout(Duration::from_secs(secs), child.wait_with_output()).await
            {
                Ok(output) => Ok(output?),
                // Dropping the future drops the child, and kill_on_drop reaps it.
                Err(_) => Err(EngineError::Timeout { timeout_secs: secs }),
            },
            None => Ok(child.wait_with_output().await?),
        }
    }

    fn check_status(output: &Output) -> Result<(), EngineError> {
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(EngineError::execution_failed(
            format!("pdal exited with code: {:?}", output.status.code()),
            if stderr.is_empty() { None } else { Some(stderr) },
        ))
    }

    /// Runs `pdal pipeline <file>` with the job written next to the input.
    async fn run_from_file(&self, job: &TransformJob) -> Result<(), EngineError> {
        let dir = job
            .input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Removed when dropped, on every return path below.
        let mut job_file = tempfile::Builder::new()
            .prefix("pipeline-")
            .suffix(".json")
            .tempfile_in(dir)?;
        job_file.write_all(job.to_json_pretty()?.as_bytes())?;
        job_file.flush()?;

        debug!(job_file = %job_file.path().display(), "Running pdal pipeline");

        let child = self
            .command()
            .arg("pipeline")
            .arg(job_file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = self.wait(child).await?;
        Self::check_status(&output)
    }

    /// Runs `pdal pipeline --stdin` with the job piped in.
    async fn run_from_stdin(&self, job: &TransformJob) -> Result<(), EngineError> {
        let json = job.to_json()?;
        debug!(input = %job.input_path.display(), "Piping job to pdal pipeline --stdin");

        let mut child = self
            .command()
            .args(["pipeline", "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(json.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = self.wait(child).await?;
        Self::check_status(&output)
    }

    /// Reads the point count and summary metadata of a written file.
    async fn summarize(&self, path: &Path) -> Result<(u64, serde_json::Value), EngineError> {
        let child = self
            .command()
            .args(["info", "--summary"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = self.wait(child).await?;
        Self::check_status(&output)?;
        Self::parse_summary(&String::from_utf8_lossy(&output.stdout))
    }

    /// Parses `pdal info --summary` JSON output.
    fn parse_summary(output: &str) -> Result<(u64, serde_json::Value), EngineError> {
        #[derive(Deserialize)]
        struct InfoOutput {
            summary: serde_json::Value,
        }

        let info: InfoOutput = serde_json::from_str(output)
            .map_err(|e| EngineError::parse_error(format!("Failed to parse pdal info: {}", e)))?;

        let count = info
            .summary
            .get("num_points")
            .and_then(|n| n.as_u64())
            .ok_or_else(|| EngineError::parse_error("pdal info summary has no num_points"))?;

        Ok((count, info.summary))
    }

    /// Extracts the version from `pdal --version` output.
    fn parse_version(output: &str) -> Option<String> {
        if let Some(caps) = VERSION_RE.captures(output) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }

        output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('-'))
            .map(str::to_string)
    }
}

#[async_trait]
impl Engine for PdalEngine {
    fn name(&self) -> &str {
        "pdal"
    }

    async fn execute(&self, job: &TransformJob) -> Result<EngineOutcome, EngineError> {
        let start = Instant::now();

        match self.config.submission {
            JobSubmission::File => {
                self.run_from_file(job).await?;
                Ok(EngineOutcome {
                    point_count: None,
                    metadata: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                })
            }
            JobSubmission::Stdin => {
                self.run_from_stdin(job).await?;
                let duration_ms = start.elapsed().as_millis() as u64;

                // The conversion already succeeded; a failed summary only loses the count.
                let (point_count, metadata) = match self.summarize(&job.output_path).await {
                    Ok((count, summary)) => (Some(count), Some(summary)),
                    Err(e) => {
                        warn!(output = %job.output_path.display(), error = %e, "Could not summarize COPC output");
                        (None, None)
                    }
                };

                Ok(EngineOutcome {
                    point_count,
                    metadata,
                    duration_ms,
                })
            }
        }
    }

    async fn validate(&self) -> Result<EngineInfo, EngineError> {
        let child = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = self.wait(child).await?;
        Self::check_status(&output)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let version = Self::parse_version(&stdout).unwrap_or_else(|| "unknown".to_string());

        Ok(EngineInfo {
            name: self.name().to_string(),
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_version_banner() {
        let banner = "--------------------------------------------------------------------------------\n\
                      pdal 2.6.3 (git-version: Release)\n\
                      --------------------------------------------------------------------------------\n";
        assert_eq!(PdalEngine::parse_version(banner), Some("2.6.3".to_string()));
    }

    #[test]
    fn test_parse_version_fallback() {
        assert_eq!(
            PdalEngine::parse_version("\n  custom-build\n"),
            Some("custom-build".to_string())
        );
        assert_eq!(PdalEngine::parse_version(""), None);
    }

    #[test]
    fn test_parse_summary() {
        let json = r#"{
            "file_size": 12345,
            "filename": "terrain.copc.laz",
            "pdal_version": "2.6.3 (git-version: Release)",
            "reader": "readers.copc",
            "summary": {
                "dimensions": "X, Y, Z, Intensity, ReturnNumber",
                "num_points": 1065
            }
        }"#;

        let (count, summary) = PdalEngine::parse_summary(json).unwrap();
        assert_eq!(count, 1065);
        assert_eq!(summary["dimensions"], "X, Y, Z, Intensity, ReturnNumber");
    }

    #[test]
    fn test_parse_summary_without_count() {
        let result = PdalEngine::parse_summary(r#"{"summary": {}}"#);
        assert!(matches!(result, Err(EngineError::ParseError { .. })));

        let result = PdalEngine::parse_summary("not json");
        assert!(matches!(result, Err(EngineError::ParseError { .. })));
    }

    #[tokio::test]
    async fn test_validate_missing_executable() {
        let engine = PdalEngine::new(EngineConfig::with_executable(
            "/nonexistent/copcify-test/pdal",
        ));
        let err = engine.validate().await.unwrap_err();
        assert!(err.is_missing_engine());
    }

    #[tokio::test]
    async fn test_execute_missing_executable_removes_job_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("terrain.las");
        std::fs::write(&input, b"LASF").unwrap();

        let engine = PdalEngine::new(EngineConfig::with_executable(PathBuf::from(
            "/nonexistent/copcify-test/pdal",
        )));
        let job = TransformJob::new(&input, dir.path().join("terrain.copc.laz"));

        let err = engine.execute(&job).await.unwrap_err();
        assert!(err.is_missing_engine());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("pipeline-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
