use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout;

/// Run the binary in `dir` with a clean configuration environment.
async fn run_copcify(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_copcify"));
    cmd.args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .env_remove("COPCIFY_CONFIG")
        .env_remove("COPCIFY_ENGINE_PATH")
        .env_remove("S3_SOURCE_BUCKET")
        .env_remove("S3_SOURCE_FOLDER")
        .env_remove("S3_TARGET_BUCKET")
        .env_remove("S3_TARGET_FOLDER");
    for (key, value) in envs {
        cmd.env(key, value);
    }

    timeout(Duration::from_secs(10), cmd.output())
        .await
        .expect("Command timed out")
        .expect("Failed to execute command")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test]
async fn test_no_arguments_prints_usage_and_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_copcify(dir.path(), &[], &[]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"));
}

#[tokio::test]
async fn test_help_succeeds() {
    let dir = TempDir::new().unwrap();
    let output = run_copcify(dir.path(), &["--help"], &[]).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("convert"));
}

#[tokio::test]
async fn test_convert_without_engine_prints_install_hint() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("terrain.las"), b"LASF").unwrap();

    let output = run_copcify(
        dir.path(),
        &[
            "convert",
            "terrain.las",
            "--engine-path",
            "/nonexistent/copcify-test/pdal",
        ],
        &[],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("PDAL not found. Please install PDAL first."));
    assert!(err.contains("brew install pdal"));
    assert!(!dir.path().join("terrain.copc.laz").exists());
}

#[tokio::test]
async fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_copcify(
        dir.path(),
        &["convert", "terrain.las"],
        &[("COPCIFY_CONFIG", "/nonexistent/copcify.toml")],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_batch_without_source_bucket_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_copcify(
        dir.path(),
        &["batch"],
        &[("S3_TARGET_BUCKET", "copc")],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("S3_SOURCE_BUCKET"));
}

#[tokio::test]
async fn test_batch_without_source_folder_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_copcify(
        dir.path(),
        &["batch"],
        &[
            ("S3_SOURCE_BUCKET", "raw"),
            ("S3_TARGET_BUCKET", "copc"),
            ("S3_TARGET_FOLDER", "converted/"),
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("S3_SOURCE_FOLDER"));
}

#[tokio::test]
async fn test_batch_event_rejects_malformed_event() {
    let dir = TempDir::new().unwrap();
    let event = dir.path().join("event.json");
    std::fs::write(&event, r#"{"invocationId": "inv"}"#).unwrap();

    let output = run_copcify(
        dir.path(),
        &["batch-event", "--event", event.to_str().unwrap()],
        &[("S3_TARGET_BUCKET", "copc")],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid batch operations event"));
}
