//! Object store provider trait for published artifacts

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Metadata about a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObjectInfo {
    /// Object key within the bucket
    pub key: String,
    /// Size in bytes
    pub size: u64,
}

/// Trait for bucket-scoped object storage
///
/// Implementations:
/// - `S3ObjectStore`: S3-compatible service (MinIO)
/// - `LocalObjectStore`: Local filesystem
#[async_trait]
pub trait ObjectStoreProvider: Send + Sync {
    /// Check whether the bucket exists without creating it
    async fn bucket_exists(&self) -> Result<bool>;

    /// Make sure the bucket exists, creating it if absent
    async fn ensure_bucket(&self) -> Result<()>;

    /// Write an object, replacing any existing object under the same key
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Read an object's bytes
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// List objects whose key starts with `prefix`, sorted by key
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObjectInfo>>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Bucket this store writes into
    fn bucket(&self) -> &str;
}

/// Fail when the bucket is missing; never creates it
pub async fn require_bucket(store: &dyn ObjectStoreProvider) -> Result<()> {
    if store.bucket_exists().await? {
        Ok(())
    } else {
        Err(Error::storage(format!(
            "bucket {} does not exist in {} store",
            store.bucket(),
            store.name()
        )))
    }
}
