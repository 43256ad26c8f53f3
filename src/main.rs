use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osmigrate::config::MigrationConfig;
use osmigrate::client::HttpClient;
use osmigrate::migrators;

#[derive(Parser, Debug)]
#[command(name = "osmigrate")]
#[command(about = "Migrate search-cluster resources from Elasticsearch to OpenSearch")]
#[command(version)]
struct Cli {
    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Migrate every index present on the source but missing on the target
    SyncIndices {
        /// Skip the confirmation prompt before writing
        #[arg(long)]
        yes: bool,
    },

    /// Migrate indices matching a pattern (e.g. dm-idx-contra*)
    Indices {
        #[arg(short, long)]
        pattern: String,
    },

    /// Migrate index templates matching a pattern (e.g. default_*)
    Templates {
        #[arg(short, long, default_value = "*")]
        pattern: String,
    },

    /// Migrate ingest pipelines (comma-separated ids)
    Pipelines {
        #[arg(short, long)]
        ids: String,
    },

    /// Migrate stored scripts (comma-separated ids)
    Scripts {
        #[arg(short, long)]
        ids: String,
    },

    /// Report index templates missing on the target, without writing
    ValidateTemplates {
        #[arg(short, long, default_value = "*")]
        pattern: String,
    },

    /// Report ingest pipelines missing on the target, without writing
    ValidatePipelines,

    /// Write a sorted batch file of source index names
    Batches {
        #[arg(long, default_value = "400")]
        batch_size: usize,
    },
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer());

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
        None => registry.init(),
    }
    Ok(())
}

fn prompt_confirm(missing: &[String]) -> bool {
    eprint!(
        "About to migrate {} indices to the target cluster. Proceed? [y/N] ",
        missing.len()
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config = MigrationConfig::from_env()?;
    let source = HttpClient::new(&config.source);
    let target = HttpClient::new(&config.target);

    match cli.command {
        Commands::SyncIndices { yes } => {
            let confirm: Box<dyn Fn(&[String]) -> bool + Send + Sync> = if yes {
                Box::new(|_: &[String]| true)
            } else {
                Box::new(|missing: &[String]| prompt_confirm(missing))
            };
            migrators::sync_missing_indices(&source, &target, confirm.as_ref()).await?;
        }
        Commands::Indices { pattern } => {
            migrators::migrate_indices_matching(&source, &target, &pattern).await?;
        }
        Commands::Templates { pattern } => {
            migrators::migrate_templates(&source, &target, &pattern).await?;
        }
        Commands::Pipelines { ids } => {
            migrators::migrate_pipelines(&source, &target, &ids).await?;
        }
        Commands::Scripts { ids } => {
            migrators::migrate_scripts(&source, &target, &ids).await?;
        }
        Commands::ValidateTemplates { pattern } => {
            migrators::validate_templates(&source, &target, &pattern).await;
        }
        Commands::ValidatePipelines => {
            migrators::validate_pipelines(&source, &target).await;
        }
        Commands::Batches { batch_size } => {
            migrators::generate_index_batches(&source, batch_size, std::path::Path::new("."))
                .await?;
        }
    }

    Ok(())
}
