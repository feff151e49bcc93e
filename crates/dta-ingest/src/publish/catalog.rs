//! Catalog of published artifacts and the tables a loader would fill from them

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::providers::{ObjectStoreProvider, StoredObjectInfo};

/// Downstream table family, keyed by the artifact's naming pattern
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableFamily {
    /// `cleaned_<stem>.csv`
    Ecommerce,
    /// `processed_<stem>.json`
    Reviews,
    /// `processed_<stem>.csv`
    Financial,
}

impl TableFamily {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ecommerce => "ecommerce",
            Self::Reviews => "reviews",
            Self::Financial => "financial",
        }
    }
}

/// Table a published artifact loads into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTarget {
    pub family: TableFamily,
    pub table: String,
}

impl LoadTarget {
    /// Derive the load table from an object key; parquet copies and unrelated keys have none
    pub fn from_key(key: &str) -> Option<Self> {
        let (family, stem) = if let Some(rest) = key.strip_prefix("cleaned_") {
            (TableFamily::Ecommerce, rest.strip_suffix(".csv")?)
        } else if let Some(rest) = key.strip_prefix("processed_") {
            if let Some(stem) = rest.strip_suffix(".json") {
                (TableFamily::Reviews, stem)
            } else {
                (TableFamily::Financial, rest.strip_suffix(".csv")?)
            }
        } else {
            return None;
        };

        if stem.is_empty() {
            return None;
        }

        Some(Self {
            family,
            table: format!("{}_{}", family.prefix(), stem),
        })
    }
}

/// One catalog line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_target: Option<LoadTarget>,
}

impl From<StoredObjectInfo> for CatalogEntry {
    fn from(object: StoredObjectInfo) -> Self {
        let load_target = LoadTarget::from_key(&object.key);
        Self {
            key: object.key,
            size: object.size,
            load_target,
        }
    }
}

/// List every object in the store with its load target
pub async fn build_catalog(store: &dyn ObjectStoreProvider) -> Result<Vec<CatalogEntry>> {
    let objects = store.list_objects("").await?;
    tracing::info!("Found {} objects in bucket {}", objects.len(), store.bucket());

    let entries: Vec<CatalogEntry> = objects.into_iter().map(CatalogEntry::from).collect();
    for entry in entries.iter().filter(|e| e.load_target.is_none()) {
        tracing::debug!("No load target for {}", entry.key);
    }
    Ok(entries)
}
