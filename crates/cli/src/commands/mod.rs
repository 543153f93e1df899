use crate::Output;
use clap::Subcommand;
use groundwork_config::{Config, ConfigLoader};
use groundwork_core::Result;
use std::path::PathBuf;
use std::sync::Arc;

pub mod cache;
pub mod checksums;
pub mod provision;

#[derive(Subcommand)]
pub enum Commands {
    /// Provision the host described by a manifest
    #[command(visible_alias = "p")]
    Provision {
        /// Path to the manifest
        manifest: PathBuf,

        /// Report what would change without touching the host
        #[arg(long)]
        dry_run: bool,

        /// Append every progress event as JSON to this file
        #[arg(long, value_name = "FILE")]
        events_log: Option<PathBuf>,
    },

    /// Show what a provisioning run would do (same as provision --dry-run)
    Plan {
        /// Path to the manifest
        manifest: PathBuf,

        /// Append every progress event as JSON to this file
        #[arg(long, value_name = "FILE")]
        events_log: Option<PathBuf>,
    },

    /// List compiled tasks and command checksums without connecting
    Checksums {
        /// Path to the manifest
        manifest: PathBuf,
    },

    /// Print the completion markers found on the host
    Cache {
        /// Path to the manifest
        manifest: PathBuf,
    },
}

impl Commands {
    pub async fn execute(self, output: Arc<Output>) -> Result<()> {
        match self {
            Commands::Provision {
                manifest,
                dry_run,
                events_log,
            } => {
                let config = load(manifest).await?;
                provision::execute(config, dry_run, events_log, output).await
            }
            Commands::Plan {
                manifest,
                events_log,
            } => {
                let config = load(manifest).await?;
                provision::execute(config, true, events_log, output).await
            }
            Commands::Checksums { manifest } => checksums::execute(load(manifest).await?),
            Commands::Cache { manifest } => cache::execute(load(manifest).await?).await,
        }
    }
}

async fn load(manifest: PathBuf) -> Result<Config> {
    ConfigLoader::new(manifest).load().await
}
