//! Event commands - handle one invocation event and print the response.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use copcify_core::{
    BatchDriver, BatchOperationsEvent, Config, DirectEvent, FileConverter, PdalEngine,
    S3ObjectStore,
};

use super::read_event;

/// Arguments shared by the event commands.
#[derive(Debug, Args)]
pub struct EventArgs {
    /// Event JSON file. Read from stdin when omitted.
    #[arg(long)]
    pub event: Option<PathBuf>,
}

async fn driver(config: &Config) -> Result<BatchDriver<S3ObjectStore, PdalEngine>> {
    let destination = config.require_destination()?;
    let store = S3ObjectStore::from_config(&config.storage).await;

    Ok(BatchDriver::new(
        Arc::new(store),
        FileConverter::new(PdalEngine::new(config.engine.clone())),
        destination,
        config.batch.clone(),
    )
    .with_acl(config.storage.acl.clone()))
}

/// Execute the batch-event command.
///
/// Per-task failures are reported in the response, so this succeeds once a
/// response has been written.
pub async fn execute_batch(args: EventArgs, config: &Config) -> Result<bool> {
    let raw = read_event(args.event.as_deref()).await?;
    let event: BatchOperationsEvent =
        serde_json::from_str(&raw).context("Invalid batch operations event")?;

    let response = driver(config).await?.handle_batch_event(event).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(true)
}

/// Execute the direct-event command.
pub async fn execute_direct(args: EventArgs, config: &Config) -> Result<bool> {
    let raw = read_event(args.event.as_deref()).await?;
    let event: DirectEvent = serde_json::from_str(&raw).context("Invalid direct event")?;

    let response = driver(config).await?.handle_direct_event(event).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(true)
}
