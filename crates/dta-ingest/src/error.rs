//! Error types for the ingestion pipeline

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File content does not match the shape expected for its kind
    #[error("Failed to parse file '{filename}': {message}")]
    Parse { filename: String, message: String },

    /// Two source columns normalize to the same name
    #[error("Column name conflict: {sources:?} all normalize to '{column}'")]
    SchemaConflict { column: String, sources: Vec<String> },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Unsupported artifact encoding
    #[error("Unsupported file format: {0}")]
    UnsupportedEncoding(String),

    /// Object store connectivity or write failure
    #[error("Object store error: {0}")]
    Storage(String),

    /// Serializing a table failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// A handler ran past its deadline
    #[error("Processing '{filename}' timed out after {}s", .after.as_secs())]
    Timeout { filename: String, after: Duration },

    /// Reading an input file failed
    #[error("Failed to read '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create an encoding error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short category label used in file reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Parse { .. } => "parse_error",
            Error::SchemaConflict { .. } => "schema_conflict",
            Error::UnsupportedFileType(_) => "unsupported_type",
            Error::UnsupportedEncoding(_) => "unsupported_encoding",
            Error::Storage(_) => "storage_error",
            Error::Encode(_) => "encode_error",
            Error::Timeout { .. } => "timeout",
            Error::FileRead { .. } => "read_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

impl From<s3::error::S3Error> for Error {
    fn from(err: s3::error::S3Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Error::Encode(format!("parquet: {}", err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Encode(format!("csv: {}", err))
    }
}
