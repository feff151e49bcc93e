//! dta-ingest: batch ingestion of raw data files into an object store
//!
//! Scans a directory of CSV, JSON and PDF files, turns each into a
//! normalized table with a format-specific handler, and publishes the
//! tables as CSV, JSON and Parquet artifacts to S3-compatible storage.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod publish;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use processing::Dispatcher;
pub use providers::{LocalObjectStore, ObjectStoreProvider, S3ObjectStore};
pub use publish::{ArtifactEncoding, ArtifactPublisher, PublishedArtifact};
pub use types::{FileKind, FileReport, NormalizedTable, RawFile, RunSummary};
