//! Ingestion CLI
//!
//! Run with: cargo run -p dta-ingest -- run --data-dir data

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dta_ingest::config::{resolve_config_path, DEFAULT_DATA_DIR};
use dta_ingest::providers::require_bucket;
use dta_ingest::publish::build_catalog;
use dta_ingest::types::FileOutcome;
use dta_ingest::{
    ArtifactPublisher, Dispatcher, IngestConfig, LocalObjectStore, ObjectStoreProvider, RunSummary,
    S3ObjectStore,
};

#[derive(Parser, Debug)]
#[command(name = "dta-ingest", version, about = "Ingest CSV, JSON and PDF files into object storage")]
struct Cli {
    #[arg(long, global = true, help = "Configuration file (default ./minio-config/config.json)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Write to a local directory instead of the object store")]
    local_store: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every file in a directory and publish the results
    Run {
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
    /// List published artifacts and the tables they load into
    Catalog,
    /// Write an object's bytes to stdout
    Show { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dta_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = IngestConfig::load_or_default(&config_path);
    tracing::info!("Configuration loaded from {}", config_path.display());
    tracing::info!("  - Endpoint: {}", config.minio.endpoint_url());
    tracing::info!("  - Bucket: {}", config.minio.bucket_name);
    tracing::info!("  - File timeout: {}s", config.processing.file_timeout_secs);

    let store = open_store(&config, cli.local_store.as_deref())?;

    match cli.command {
        Commands::Run { data_dir } => {
            store.ensure_bucket().await.with_context(|| {
                format!(
                    "object store {} is not usable (bucket {})",
                    store.name(),
                    store.bucket()
                )
            })?;

            let dispatcher = Dispatcher::new(ArtifactPublisher::new(store), config.processing.clone());

            let cancelled = dispatcher.cancel_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupt received, stopping after the current file");
                    cancelled.store(true, Ordering::SeqCst);
                }
            });

            let summary = dispatcher
                .run(&data_dir)
                .await
                .with_context(|| format!("cannot ingest {}", data_dir.display()))?;
            print_summary(&summary, cli.json)?;
        }
        Commands::Catalog => {
            require_bucket(store.as_ref()).await?;
            let entries = build_catalog(store.as_ref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    let target = entry
                        .load_target
                        .as_ref()
                        .map(|t| t.table.as_str())
                        .unwrap_or("-");
                    println!("{:<48} {:>10}  {}", entry.key, entry.size, target);
                }
            }
        }
        Commands::Show { key } => {
            require_bucket(store.as_ref()).await?;
            let data = store.get_object(&key).await?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn open_store(config: &IngestConfig, local_root: Option<&Path>) -> anyhow::Result<Arc<dyn ObjectStoreProvider>> {
    match local_root {
        Some(root) => {
            tracing::info!("Using local store at {}", root.display());
            Ok(Arc::new(LocalObjectStore::new(root, &config.minio.bucket_name)))
        }
        None => Ok(Arc::new(S3ObjectStore::new(&config.minio)?)),
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for report in &summary.reports {
        match &report.outcome {
            FileOutcome::Processed {
                rows,
                artifacts,
                failed_artifacts,
            } => {
                let keys: Vec<&str> = artifacts.iter().map(|a| a.key.as_str()).collect();
                println!("processed  {} ({} rows) -> {}", report.filename, rows, keys.join(", "));
                for key in failed_artifacts {
                    println!("           upload failed: {}", key);
                }
            }
            FileOutcome::Skipped { .. } => println!("skipped    {} (unsupported format)", report.filename),
            FileOutcome::Failed { stage, message, .. } => {
                println!("failed     {} at {}: {}", report.filename, stage, message)
            }
        }
    }

    let counts = summary.counts();
    println!(
        "\n{} files: {} processed, {} skipped, {} failed{}",
        counts.total(),
        counts.processed,
        counts.skipped,
        counts.failed,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    Ok(())
}
