//!
//! This module implements the CLI interface for apipost-sync: command parsing,
//! input loading and the user-visible upload summary.
//!
//! All pipeline logic (batching, conversion, concurrent upload, reporting) lives
//! in the [`apipost-sync-core`] crate. This module is strictly CLI glue.
//!
//! ## How To Use
//! - For command-line users: use the installed `apipost-sync` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`apipost-sync-core`]: ../../apipost-sync-core/
use crate::load_config::load_config;
use crate::upload::ApiPostClient;
use anyhow::{Context, Result};
use apipost_sync_core::category::apply_work_dir;
use apipost_sync_core::contract::Api;
use apipost_sync_core::convert::OpenApiConverter;
use apipost_sync_core::synchronise::{synchronise, SyncOutcome, SynchroniseConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CLI for apipost-sync: upload API definitions to ApiPost.
#[derive(Parser)]
#[clap(
    name = "apipost-sync",
    version,
    about = "Convert API definitions to OpenAPI and upload them to ApiPost in parallel batches"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload all APIs of one module to the configured ApiPost project
    Upload {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Path to a JSON array of API definitions
        #[clap(long)]
        apis: PathBuf,
        /// Module name, used as the title of every uploaded document
        #[clap(long)]
        module: String,
        /// Folder to file every API under; overrides `upload.work_dir`
        #[clap(long)]
        work_dir: Option<String>,
    },
}

/// Reads the JSON array of APIs to upload.
pub fn load_apis(path: &Path) -> Result<Vec<Api>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read APIs file {path:?}"))?;
    let apis: Vec<Api> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse APIs file {path:?}"))?;
    tracing::info!(apis_path = ?path, count = apis.len(), "Loaded APIs");
    Ok(apis)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Upload {
            config,
            apis,
            module,
            work_dir,
        } => {
            let config = load_config(config)?;
            let mut apis = load_apis(&apis)?;

            let work_dir = work_dir.or_else(|| config.upload.work_dir.clone());
            apply_work_dir(&mut apis, work_dir.as_deref())
                .context("Pass exactly one folder with --work-dir")?;

            let target = config.target();
            target.trace_loaded();
            let sync_config = SynchroniseConfig::new(target, module)
                .with_chunk_size(config.upload.chunk_size);

            let client = ApiPostClient::new(config.timeout())?;
            tracing::info!(command = "upload", "Starting upload");
            let outcome = synchronise(
                &sync_config,
                &apis,
                Arc::new(OpenApiConverter::new()),
                Arc::new(client),
            )
            .await;

            let (title, message) = outcome.notification();
            println!("{title}: {message}");

            if outcome.is_success() {
                tracing::info!(command = "upload", ?outcome, "Upload complete");
                return Ok(());
            }

            match &outcome {
                SyncOutcome::Interrupted { lost_apis, .. } => {
                    tracing::error!(command = "upload", ?outcome, "Upload interrupted");
                    Err(anyhow::anyhow!(
                        "Upload interrupted, {lost_apis} Api in unknown state"
                    ))
                }
                _ => {
                    tracing::error!(command = "upload", ?outcome, "Upload finished with failures");
                    Err(anyhow::anyhow!("Upload finished with failures: {message}"))
                }
            }
        }
    }
}
