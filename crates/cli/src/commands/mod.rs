//! Subcommand implementations.
//!
//! Each command returns `Ok(true)` when the process should exit 0 and
//! `Ok(false)` when the work ran but something failed.

pub mod batch;
pub mod convert;
pub mod event;

use anyhow::{Context, Result};
use tracing::info;

use copcify_core::{Engine, EngineError, PdalEngine};

/// Confirms the engine is installed and logs its version.
pub(crate) async fn preflight(engine: &PdalEngine) -> Result<(), EngineError> {
    let info = engine.validate().await?;
    info!("Using {} {}", info.name, info.version);
    Ok(())
}

/// Prints how to install PDAL when the executable is missing.
pub(crate) fn print_install_hint(err: &EngineError) {
    eprintln!("ERROR: PDAL not found. Please install PDAL first.");
    eprintln!("{}", err);
    eprintln!("Install with: brew install pdal  # on macOS");
    eprintln!("          or: conda install -c conda-forge pdal");
    eprintln!("          or: apt-get install pdal  # on Debian/Ubuntu");
}

/// Reads an event document from a file, or stdin when no file is given.
pub(crate) async fn read_event(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event from {:?}", path)),
        None => {
            use tokio::io::AsyncReadExt;

            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read event from stdin")?;
            Ok(buf)
        }
    }
}
