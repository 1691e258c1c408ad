//! End-to-end `copcify convert` runs against a stand-in `pdal` script.
//!
//! Kept in its own test binary with a single test: an executable must not
//! be written while another thread of the same process is forking.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout;

fn write_fake_pdal(dir: &Path) -> String {
    let script = dir.join("pdal");
    std::fs::write(
        &script,
        r#"#!/bin/sh
case "$1" in
  --version)
    echo "pdal 2.6.3 (git-version: Release)"
    ;;
  pipeline)
    out=$(sed -n 's/.*"filename": *"\([^"]*\)".*/\1/p' "$2")
    printf 'COPC' > "$out"
    ;;
esac
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script.to_string_lossy().into_owned()
}

async fn convert(dir: &Path, pdal: &str, args: &[&str]) -> Output {
    let child = tokio::process::Command::new(env!("CARGO_BIN_EXE_copcify"))
        .arg("convert")
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error")
        .env("COPCIFY_ENGINE_PATH", pdal)
        .env_remove("COPCIFY_CONFIG")
        .output();

    timeout(Duration::from_secs(10), child)
        .await
        .expect("Command timed out")
        .expect("Failed to execute command")
}

#[tokio::test]
async fn test_convert_exit_codes() {
    let dir = TempDir::new().unwrap();
    let pdal = write_fake_pdal(dir.path());
    std::fs::write(dir.path().join("terrain.las"), b"LASF").unwrap();
    std::fs::write(dir.path().join("terrain.txt"), b"text").unwrap();

    let output = convert(dir.path(), &pdal, &["terrain.las"]).await;
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        std::fs::read(dir.path().join("terrain.copc.laz")).unwrap(),
        b"COPC"
    );

    let output = convert(dir.path(), &pdal, &["terrain.las", "custom.copc.laz"]).await;
    assert_eq!(output.status.code(), Some(0));
    assert!(dir.path().join("custom.copc.laz").exists());

    let output = convert(dir.path(), &pdal, &["missing.las"]).await;
    assert_eq!(output.status.code(), Some(1));

    let output = convert(dir.path(), &pdal, &["terrain.txt"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("terrain.txt.copc.laz").exists());
}
