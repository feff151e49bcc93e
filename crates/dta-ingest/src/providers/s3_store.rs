//! S3-compatible object store (MinIO)
//!
//! Path-style addressing against a custom endpoint, credentials taken from
//! the `minio` configuration section.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};

use super::object_store::{ObjectStoreProvider, StoredObjectInfo};
use crate::config::MinioConfig;
use crate::error::{Error, Result};

/// Object store backed by an S3-compatible service
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    bucket_name: String,
    endpoint: String,
}

impl S3ObjectStore {
    /// Build a client from configuration; no network traffic happens here
    pub fn new(config: &MinioConfig) -> Result<Self> {
        let endpoint = config.endpoint_url();
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: endpoint.clone(),
        };

        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| Error::Config(format!("Invalid object store credentials: {}", e)))?;

        let bucket = Bucket::new(&config.bucket_name, region.clone(), credentials.clone())?
            .with_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            bucket_name: config.bucket_name.clone(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStoreProvider for S3ObjectStore {
    async fn bucket_exists(&self) -> Result<bool> {
        self.bucket.exists().await.map_err(|e| {
            Error::storage(format!(
                "cannot reach object store at {}: {}",
                self.endpoint, e
            ))
        })
    }

    async fn ensure_bucket(&self) -> Result<()> {
        if self.bucket_exists().await? {
            tracing::info!("Bucket {} exists", self.bucket_name);
            return Ok(());
        }

        Bucket::create_with_path_style(
            &self.bucket_name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| Error::storage(format!("failed to create bucket {}: {}", self.bucket_name, e)))?;

        tracing::info!("Created bucket {}", self.bucket_name);
        Ok(())
    }

    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| Error::storage(format!("failed to upload {}: {}", key, e)))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| Error::storage(format!("failed to read object {}: {}", key, e)))?;
        Ok(response.bytes().to_vec())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObjectInfo>> {
        let pages = self.bucket.list(prefix.to_string(), None).await?;

        let mut objects: Vec<StoredObjectInfo> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| StoredObjectInfo {
                key: object.key,
                size: object.size,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn name(&self) -> &str {
        "s3"
    }

    fn bucket(&self) -> &str {
        &self.bucket_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_from_default_config() {
        let store = S3ObjectStore::new(&MinioConfig::default()).unwrap();
        assert_eq!(store.endpoint(), "http://localhost:9000");
        assert_eq!(store.bucket(), "dta_bucket");
        assert_eq!(store.name(), "s3");
    }

    #[test]
    fn test_explicit_scheme_kept() {
        let config = MinioConfig {
            endpoint: "https://minio.internal:9443".to_string(),
            ..MinioConfig::default()
        };
        let store = S3ObjectStore::new(&config).unwrap();
        assert_eq!(store.endpoint(), "https://minio.internal:9443");
    }
}
