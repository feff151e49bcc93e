//! Configuration for the ingestion pipeline
//!
//! Loaded from a JSON file whose fields are all optional. A missing or
//! malformed file never aborts a run: every field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "./minio-config/config.json";

/// Default directory scanned for raw files
pub const DEFAULT_DATA_DIR: &str = "data";

/// Main ingestion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Object store (MinIO / S3) connection
    #[serde(default)]
    pub minio: MinioConfig,
    /// Processing limits
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl IngestConfig {
    /// Parse a configuration document
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Config(format!("malformed config: {}", e)))
    }

    /// Read a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Load configuration, falling back to defaults on any problem
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Could not load config file, using defaults: {}", e);
                Self::default()
            }
        }
    }
}

/// MinIO connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinioConfig {
    /// Host and port, with or without scheme
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Access key id
    #[serde(default = "default_access_key")]
    pub access_key: String,
    /// Secret access key
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Target bucket
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,
    /// Signing region (MinIO ignores it but S3 signatures need one)
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_endpoint() -> String { "localhost:9000".to_string() }
fn default_access_key() -> String { "minioadmin".to_string() }
fn default_secret_key() -> String { "minioadmin".to_string() }
fn default_bucket_name() -> String { "dta_bucket".to_string() }
fn default_region() -> String { "us-east-1".to_string() }

impl Default for MinioConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            access_key: default_access_key(),
            secret_key: default_secret_key(),
            bucket_name: default_bucket_name(),
            region: default_region(),
        }
    }
}

impl MinioConfig {
    /// Endpoint URL with an `http://` scheme added when none is given
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// Processing limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Timeout for handling a single file in seconds (default: 300)
    #[serde(default = "default_file_timeout")]
    pub file_timeout_secs: u64,
    /// Deadline for the whole run in seconds; files not started by then are left alone
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

fn default_file_timeout() -> u64 { 300 }

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            file_timeout_secs: default_file_timeout(),
            run_timeout_secs: None,
        }
    }
}

impl ProcessingConfig {
    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs.max(1))
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

/// Resolve the config path: explicit argument first, then the default location
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
