//! Filesystem-backed object store
//!
//! Objects live at `<root>/<bucket>/<key>`. Used for offline runs and tests.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::object_store::{ObjectStoreProvider, StoredObjectInfo};
use crate::error::{Error, Result};

/// Local object store rooted at a directory
pub struct LocalObjectStore {
    root: PathBuf,
    bucket: String,
}

impl LocalObjectStore {
    /// Create a store; the bucket directory is created by `ensure_bucket`
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    /// Path for a key, refusing keys that would escape the bucket directory
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(Error::storage(format!("invalid object key '{}'", key)));
        }
        Ok(self.bucket_dir().join(relative))
    }
}

#[async_trait]
impl ObjectStoreProvider for LocalObjectStore {
    async fn bucket_exists(&self) -> Result<bool> {
        Ok(tokio::fs::metadata(self.bucket_dir())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn ensure_bucket(&self) -> Result<()> {
        let dir = self.bucket_dir();
        if !self.bucket_exists().await? {
            tracing::info!("Creating bucket directory {}", dir.display());
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::storage(format!("cannot create bucket {}: {}", dir.display(), e)))
    }

    async fn put_object(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::storage(format!("failed to write {}: {}", key, e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| Error::storage(format!("failed to write {}: {}", key, e)))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::storage(format!("failed to read object {}: {}", key, e)))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObjectInfo>> {
        let dir = self.bucket_dir();
        let prefix = prefix.to_string();

        tokio::task::spawn_blocking(move || {
            let mut objects = Vec::new();
            if !dir.is_dir() {
                return Ok(objects);
            }
            for entry in WalkDir::new(&dir).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(|e| Error::storage(format!("failed to list bucket: {}", e)))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let key = entry
                    .path()
                    .strip_prefix(&dir)
                    .map_err(|e| Error::internal(e.to_string()))?
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                if !key.starts_with(&prefix) {
                    continue;
                }
                let size = entry
                    .metadata()
                    .map_err(|e| Error::storage(format!("failed to stat {}: {}", key, e)))?
                    .len();
                objects.push(StoredObjectInfo { key, size });
            }
            objects.sort_by(|a, b| a.key.cmp(&b.key));
            Ok(objects)
        })
        .await
        .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
