//! Batch command - convert everything under the source prefix.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use copcify_core::{metrics, BatchDriver, Config, FileConverter, PdalEngine, S3ObjectStore};

use super::preflight;

/// Arguments for the batch command.
#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Write Prometheus metrics in text format to this file when done.
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,
}

/// Execute the batch command.
///
/// Prints the run summary as JSON on stdout. Returns `false` when any item
/// failed.
pub async fn execute(args: BatchArgs, config: &Config) -> Result<bool> {
    let source = config.require_source()?;
    let destination = config.require_destination()?;

    let engine = PdalEngine::new(config.engine.clone());
    preflight(&engine).await.context("PDAL is not usable")?;

    let store = S3ObjectStore::from_config(&config.storage).await;
    info!(
        "Converting s3://{}/{} into s3://{}/{}",
        source.bucket, source.prefix, destination.bucket, destination.prefix
    );

    let driver = BatchDriver::new(
        Arc::new(store),
        FileConverter::new(engine),
        destination,
        config.batch.clone(),
    )
    .with_source(source)
    .with_acl(config.storage.acl.clone());

    let summary = driver.run_listing().await.context("Batch run failed")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = &args.metrics_file {
        std::fs::write(path, metrics::encode_text())
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;
        info!("Metrics written to {:?}", path);
    }

    if !summary.all_succeeded() {
        error!(
            "{} of {} conversions failed",
            summary.failed, summary.attempted
        );
    }
    Ok(summary.all_succeeded())
}
