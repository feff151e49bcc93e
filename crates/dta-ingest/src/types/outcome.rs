//! Per-file outcomes and the run summary they aggregate into

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::file_kind::{FileKind, RawFile};
use crate::error::Error;
use crate::publish::PublishedArtifact;

/// Coarse status of a processed file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Processed,
    Skipped,
    Failed,
}

/// Reason why a file was skipped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No handler for this extension
    UnsupportedFormat,
}

/// Stage at which a file failed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Reading,
    Handling,
    Publishing,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Reading => write!(f, "reading"),
            ProcessingStage::Handling => write!(f, "handling"),
            ProcessingStage::Publishing => write!(f, "publishing"),
        }
    }
}

/// What happened to one file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Handler produced a table and at least one artifact was published
    Processed {
        rows: usize,
        artifacts: Vec<PublishedArtifact>,
        /// Keys whose upload failed
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        failed_artifacts: Vec<String>,
    },
    /// File was not handled
    Skipped { reason: SkipReason },
    /// File could not be read, handled, or published
    Failed {
        stage: ProcessingStage,
        error_kind: String,
        message: String,
    },
}

/// Record of one file's trip through the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub filename: String,
    pub kind: FileKind,
    pub file_size: u64,
    /// SHA-256 of the raw content, when it was read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
    pub processed_at: DateTime<Utc>,
}

impl FileReport {
    fn for_raw(raw: &RawFile, content_hash: Option<String>, outcome: FileOutcome) -> Self {
        Self {
            filename: raw.filename(),
            kind: raw.kind(),
            file_size: raw.size(),
            content_hash,
            outcome,
            processed_at: Utc::now(),
        }
    }

    /// A file whose table was produced and published
    pub fn processed(
        raw: &RawFile,
        rows: usize,
        artifacts: Vec<PublishedArtifact>,
        failed_artifacts: Vec<String>,
    ) -> Self {
        Self::for_raw(
            raw,
            Some(raw.content_hash()),
            FileOutcome::Processed {
                rows,
                artifacts,
                failed_artifacts,
            },
        )
    }

    /// A file without a handler
    pub fn skipped(raw: &RawFile, reason: SkipReason) -> Self {
        Self::for_raw(raw, None, FileOutcome::Skipped { reason })
    }

    /// A file that failed at `stage`
    pub fn failed(raw: &RawFile, stage: ProcessingStage, error: &Error) -> Self {
        Self::for_raw(
            raw,
            Some(raw.content_hash()),
            FileOutcome::Failed {
                stage,
                error_kind: error.kind().to_string(),
                message: error.to_string(),
            },
        )
    }

    /// A file that could not even be read
    pub fn unreadable(path: &Path, error: &Error) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            filename,
            kind: FileKind::from_path(path),
            file_size: 0,
            content_hash: None,
            outcome: FileOutcome::Failed {
                stage: ProcessingStage::Reading,
                error_kind: error.kind().to_string(),
                message: error.to_string(),
            },
            processed_at: Utc::now(),
        }
    }

    pub fn status(&self) -> FileStatus {
        match self.outcome {
            FileOutcome::Processed { .. } => FileStatus::Processed,
            FileOutcome::Skipped { .. } => FileStatus::Skipped,
            FileOutcome::Failed { .. } => FileStatus::Failed,
        }
    }

    /// Keys successfully published for this file
    pub fn artifact_keys(&self) -> Vec<&str> {
        match &self.outcome {
            FileOutcome::Processed { artifacts, .. } => {
                artifacts.iter().map(|a| a.key.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Aggregate counts for a set of reports
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    fn add(&mut self, status: FileStatus) {
        match status {
            FileStatus::Processed => self.processed += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Result of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub data_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Set when cancellation or the run deadline stopped the scan early
    pub interrupted: bool,
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            data_dir: data_dir.to_path_buf(),
            started_at: Utc::now(),
            finished_at: None,
            interrupted: false,
            reports: Vec::new(),
        }
    }

    pub fn record(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Counts over every file
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for report in &self.reports {
            counts.add(report.status());
        }
        counts
    }

    /// Counts per file kind
    pub fn counts_by_kind(&self) -> BTreeMap<FileKind, OutcomeCounts> {
        let mut by_kind: BTreeMap<FileKind, OutcomeCounts> = BTreeMap::new();
        for report in &self.reports {
            by_kind.entry(report.kind).or_default().add(report.status());
        }
        by_kind
    }

    /// Report for a file name, if it was seen
    pub fn report(&self, filename: &str) -> Option<&FileReport> {
        self.reports.iter().find(|r| r.filename == filename)
    }

    /// Emit the per-category totals
    pub fn log_totals(&self) {
        for (kind, counts) in self.counts_by_kind() {
            tracing::info!(
                "{} files: {} processed, {} skipped, {} failed",
                kind,
                counts.processed,
                counts.skipped,
                counts.failed
            );
        }
        let totals = self.counts();
        tracing::info!(
            "Run {} finished: {} files, {} processed, {} skipped, {} failed{}",
            self.run_id,
            totals.total(),
            totals.processed,
            totals.skipped,
            totals.failed,
            if self.interrupted { " (interrupted)" } else { "" }
        );
    }
}
