//! Convert command - convert one local file.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::error;

use copcify_core::{Config, FileConverter, PdalEngine};

use super::{preflight, print_install_hint};

/// Arguments for the convert command.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// LAS or LAZ file to convert.
    pub input: PathBuf,

    /// Output file. Defaults to `<input stem>.copc.laz` next to the input.
    pub output: Option<PathBuf>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: &Config) -> Result<bool> {
    let engine = PdalEngine::new(config.engine.clone());

    if let Err(e) = preflight(&engine).await {
        if e.is_missing_engine() {
            print_install_hint(&e);
        } else {
            error!("PDAL check failed: {}", e);
        }
        return Ok(false);
    }

    let converter = FileConverter::new(engine);
    Ok(converter
        .convert(&args.input, args.output.as_deref())
        .await)
}
