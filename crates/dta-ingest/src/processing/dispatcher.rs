//! Sequential dispatch of scanned files to handlers and the publisher

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::ProcessingConfig;
use crate::error::{Error, Result};
use crate::ingestion::{load_raw_file, DirectoryScanner, FileParser};
use crate::publish::{artifact_plan, ArtifactPublisher};
use crate::types::{FileReport, NormalizedTable, ProcessingStage, RawFile, RunSummary, SkipReason};

/// Turns a raw file into a table; runs on the blocking pool
pub type FileHandler = fn(&RawFile) -> Result<NormalizedTable>;

/// Drives one ingestion run over a directory
pub struct Dispatcher {
    publisher: ArtifactPublisher,
    config: ProcessingConfig,
    handler: FileHandler,
    cancelled: Arc<AtomicBool>,
}

impl Dispatcher {
    pub fn new(publisher: ArtifactPublisher, config: ProcessingConfig) -> Self {
        Self {
            publisher,
            config,
            handler: FileParser::parse,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the extension-based handler
    pub fn with_handler(mut self, handler: FileHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Flag that stops the run before the next file when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Process every file in `data_dir`, one at a time.
    ///
    /// Only an unusable directory is an error; per-file failures end up in
    /// the summary.
    pub async fn run(&self, data_dir: &Path) -> Result<RunSummary> {
        let scanner = DirectoryScanner::new(data_dir)?;
        let deadline = self.config.run_timeout().map(|limit| Instant::now() + limit);

        let mut summary = RunSummary::new(data_dir);
        tracing::info!(
            "Starting ingestion run {} over {} into {}",
            summary.run_id,
            data_dir.display(),
            self.publisher.store().bucket()
        );

        for entry in scanner {
            if self.cancelled.load(Ordering::SeqCst) {
                tracing::warn!("Run cancelled, remaining files not started");
                summary.interrupted = true;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!("Run deadline reached, remaining files not started");
                summary.interrupted = true;
                break;
            }

            let report = match entry {
                Ok(path) => self.process_path(path).await,
                Err(e) => {
                    tracing::error!("Error reading file: {}", e);
                    let path = match &e {
                        Error::FileRead { path, .. } => path.clone(),
                        _ => data_dir.to_path_buf(),
                    };
                    FileReport::unreadable(&path, &e)
                }
            };
            summary.record(report);
        }

        summary.finish();
        summary.log_totals();
        Ok(summary)
    }

    /// Read, handle and publish one scanned file. Reading and handling share
    /// the per-file time budget.
    async fn process_path(&self, path: PathBuf) -> FileReport {
        let limit = self.config.file_timeout();
        let file_deadline = Instant::now() + limit;

        let raw = match tokio::time::timeout_at(file_deadline, load_raw_file(path.clone())).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::error!("Error reading file: {}", e);
                return FileReport::unreadable(&path, &e);
            }
            Err(_) => {
                let e = Error::Timeout {
                    filename: path.display().to_string(),
                    after: limit,
                };
                tracing::error!("Error reading file: {}", e);
                return FileReport::unreadable(&path, &e);
            }
        };

        self.process_raw(raw, file_deadline).await
    }

    /// Handle and publish one loaded file; never fails, the outcome is in the report
    async fn process_raw(&self, raw: RawFile, file_deadline: Instant) -> FileReport {
        let filename = raw.filename();

        if !raw.kind().is_supported() {
            tracing::warn!("Skipping unsupported file format: {}", filename);
            return FileReport::skipped(&raw, SkipReason::UnsupportedFormat);
        }

        tracing::info!("Processing {} file {}", raw.kind(), filename);
        let raw = Arc::new(raw);

        let table = match self.handle(raw.clone(), file_deadline).await {
            Ok(table) => table,
            Err(e) => {
                tracing::error!("Error processing {}: {}", filename, e);
                return FileReport::failed(&raw, ProcessingStage::Handling, &e);
            }
        };

        let mut artifacts = Vec::new();
        let mut failed_keys = Vec::new();
        let mut last_error = None;
        for planned in artifact_plan(&raw) {
            match self.publisher.publish(&table, &planned.key, planned.encoding).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    failed_keys.push(planned.key);
                    last_error = Some(e);
                }
            }
        }

        if artifacts.is_empty() {
            if let Some(e) = last_error {
                tracing::error!("No artifacts published for {}: {}", filename, e);
                return FileReport::failed(&raw, ProcessingStage::Publishing, &e);
            }
        }

        tracing::info!(
            "Processed {}: {} rows, {} artifacts published, {} failed",
            filename,
            table.row_count(),
            artifacts.len(),
            failed_keys.len()
        );
        FileReport::processed(&raw, table.row_count(), artifacts, failed_keys)
    }

    /// Run the handler on the blocking pool until `file_deadline`.
    /// A timed-out handler is detached and left to finish on its own; a
    /// panicking one fails only its file.
    async fn handle(&self, raw: Arc<RawFile>, file_deadline: Instant) -> Result<NormalizedTable> {
        let handler = self.handler;
        let filename = raw.filename();
        let task = tokio::task::spawn_blocking(move || handler(raw.as_ref()));

        match tokio::time::timeout_at(file_deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) if e.is_panic() => Err(Error::Internal(format!(
                "handler panicked while processing {}",
                filename
            ))),
            Ok(Err(e)) => Err(Error::Internal(format!("Task join error: {}", e))),
            Err(_) => Err(Error::Timeout {
                filename,
                after: self.config.file_timeout(),
            }),
        }
    }
}
