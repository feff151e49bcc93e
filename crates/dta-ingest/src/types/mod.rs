//! Core types for the ingestion pipeline

pub mod file_kind;
pub mod outcome;
pub mod record;
pub mod table;

pub use file_kind::{FileKind, RawFile};
pub use outcome::{FileOutcome, FileReport, FileStatus, OutcomeCounts, ProcessingStage, RunSummary, SkipReason};
pub use record::FinancialRecord;
pub use table::{Column, ColumnType, NormalizedTable};
