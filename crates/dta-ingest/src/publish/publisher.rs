//! Uploads encoded tables to the object store

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::encoding::ArtifactEncoding;
use crate::error::Result;
use crate::providers::ObjectStoreProvider;
use crate::types::NormalizedTable;

/// An object written by the publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedArtifact {
    pub key: String,
    pub encoding: ArtifactEncoding,
    /// Size in bytes
    pub size: u64,
}

/// Writes tables to a store under caller-chosen keys
#[derive(Clone)]
pub struct ArtifactPublisher {
    store: Arc<dyn ObjectStoreProvider>,
}

impl ArtifactPublisher {
    pub fn new(store: Arc<dyn ObjectStoreProvider>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStoreProvider> {
        &self.store
    }

    /// Encode `table` and write it under `key`, replacing any existing object
    pub async fn publish(
        &self,
        table: &NormalizedTable,
        key: &str,
        encoding: ArtifactEncoding,
    ) -> Result<PublishedArtifact> {
        let data = encoding.encode(table).map_err(|e| {
            tracing::error!("Failed to encode {} as {}: {}", key, encoding, e);
            e
        })?;
        let size = data.len() as u64;

        match self
            .store
            .put_object(key, data, &encoding.content_type())
            .await
        {
            Ok(()) => {
                tracing::info!(
                    "Saved {} to {}/{} ({} bytes)",
                    encoding,
                    self.store.bucket(),
                    key,
                    size
                );
                Ok(PublishedArtifact {
                    key: key.to_string(),
                    encoding,
                    size,
                })
            }
            Err(e) => {
                tracing::error!("Error saving {} to {}: {}", key, self.store.name(), e);
                Err(e)
            }
        }
    }

    /// Publish by encoding name, as accepted on the command line
    pub async fn publish_named(
        &self,
        table: &NormalizedTable,
        key: &str,
        encoding: &str,
    ) -> Result<PublishedArtifact> {
        let encoding: ArtifactEncoding = encoding.parse()?;
        self.publish(table, key, encoding).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::LocalObjectStore;
    use serde_json::json;

    async fn local_publisher(dir: &std::path::Path) -> ArtifactPublisher {
        let store = LocalObjectStore::new(dir, "dta_bucket");
        store.ensure_bucket().await.unwrap();
        ArtifactPublisher::new(Arc::new(store))
    }

    fn table(value: i64) -> NormalizedTable {
        NormalizedTable::new(vec!["n".into()], vec![vec![json!(value)]]).unwrap()
    }

    #[tokio::test]
    async fn test_publish_twice_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = local_publisher(dir.path()).await;

        publisher.publish(&table(1), "cleaned_x.csv", ArtifactEncoding::Csv).await.unwrap();
        let second = publisher.publish(&table(22), "cleaned_x.csv", ArtifactEncoding::Csv).await.unwrap();

        let objects = publisher.store().list_objects("").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].size, second.size);
        assert_eq!(publisher.store().get_object("cleaned_x.csv").await.unwrap(), b"n\n22\n");
    }

    #[tokio::test]
    async fn test_unknown_encoding_name_is_error_value() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = local_publisher(dir.path()).await;

        let result = publisher.publish_named(&table(1), "x.xlsx", "xlsx").await;
        assert!(matches!(result, Err(Error::UnsupportedEncoding(_))));
        assert!(publisher.store().list_objects("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_returned() {
        let dir = tempfile::tempdir().unwrap();
        // Bucket directory never created; a file sits where it should be
        std::fs::write(dir.path().join("dta_bucket"), b"").unwrap();
        let publisher = ArtifactPublisher::new(Arc::new(LocalObjectStore::new(dir.path(), "dta_bucket")));

        let result = publisher.publish(&table(1), "k.json", ArtifactEncoding::Json).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
