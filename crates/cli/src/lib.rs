//! # copcify
//!
//! Command-line front end for the LAS/LAZ to COPC converter.
//!
//! ## Commands
//!
//! - `copcify convert` - Convert one local file
//! - `copcify batch` - Convert every LAS/LAZ object under the source prefix
//! - `copcify batch-event` - Answer an S3 Batch Operations invocation
//! - `copcify direct-event` - Convert the single object named by an event
//!
//! ## Configuration
//!
//! Settings come from an optional TOML file and the environment:
//!
//! - `COPCIFY_CONFIG` - Config file (default: `copcify.toml` if present)
//! - `COPCIFY_ENGINE_PATH` - Path to the `pdal` executable
//! - `S3_SOURCE_BUCKET`, `S3_SOURCE_FOLDER`, `S3_TARGET_BUCKET`,
//!   `S3_TARGET_FOLDER` - Bucket locations
//! - `COPCIFY_<SECTION>__<KEY>` - Any config key, e.g. `COPCIFY_ENGINE__SUBMISSION`

pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use copcify_core::{load_config, resolve_config_path, validate_config, Config};

/// Convert LAS/LAZ point clouds to Cloud-Optimized Point Cloud (COPC).
#[derive(Debug, Parser)]
#[command(name = "copcify")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "COPCIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Path to the pdal executable.
    #[arg(long, global = true, env = "COPCIFY_ENGINE_PATH")]
    pub engine_path: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Loads, overrides and validates the effective configuration.
    pub fn load_settings(&self) -> Result<Config> {
        let path = resolve_config_path(self.config.as_deref());
        match &path {
            Some(path) => info!("Loading configuration from {:?}", path),
            None => info!("No configuration file, using defaults and environment"),
        }

        let mut config = load_config(path.as_deref())
            .with_context(|| format!("Failed to load config from {:?}", path))?;

        if let Some(engine_path) = &self.engine_path {
            config.engine.executable = engine_path.clone();
        }

        validate_config(&config).context("Configuration validation failed")?;
        Ok(config)
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert a local LAS/LAZ file to COPC.
    Convert(commands::convert::ConvertArgs),
    /// Convert every LAS/LAZ object under the configured source prefix.
    Batch(commands::batch::BatchArgs),
    /// Handle an S3 Batch Operations invocation event.
    BatchEvent(commands::event::EventArgs),
    /// Handle a direct event naming one source object.
    DirectEvent(commands::event::EventArgs),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}
