//! Object key naming for published artifacts

use super::encoding::ArtifactEncoding;
use crate::types::{FileKind, RawFile};

/// One artifact to publish for a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    pub key: String,
    pub encoding: ArtifactEncoding,
}

impl PlannedArtifact {
    fn new(key: String, encoding: ArtifactEncoding) -> Self {
        Self { key, encoding }
    }
}

/// Keys and encodings written for a source file, in publish order
pub fn artifact_plan(raw: &RawFile) -> Vec<PlannedArtifact> {
    plan_for(raw.kind(), &raw.filename(), &raw.stem())
}

/// Keys derived from the kind, the full file name and the name without extension
pub fn plan_for(kind: FileKind, filename: &str, stem: &str) -> Vec<PlannedArtifact> {
    match kind {
        FileKind::Csv => vec![
            PlannedArtifact::new(format!("cleaned_{}", filename), ArtifactEncoding::Csv),
            PlannedArtifact::new(format!("cleaned_{}.parquet", stem), ArtifactEncoding::Parquet),
        ],
        FileKind::Json => vec![
            PlannedArtifact::new(format!("processed_{}", filename), ArtifactEncoding::Json),
            PlannedArtifact::new(format!("processed_{}.parquet", stem), ArtifactEncoding::Parquet),
        ],
        FileKind::Pdf => vec![
            PlannedArtifact::new(format!("processed_{}.json", stem), ArtifactEncoding::Json),
            PlannedArtifact::new(format!("processed_{}.csv", stem), ArtifactEncoding::Csv),
        ],
        FileKind::Unsupported => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(filename: &str) -> Vec<(String, ArtifactEncoding)> {
        artifact_plan(&RawFile::from_bytes(filename, Vec::new()))
            .into_iter()
            .map(|p| (p.key, p.encoding))
            .collect()
    }

    #[test]
    fn test_csv_keys() {
        assert_eq!(
            keys("orders.csv"),
            vec![
                ("cleaned_orders.csv".to_string(), ArtifactEncoding::Csv),
                ("cleaned_orders.parquet".to_string(), ArtifactEncoding::Parquet),
            ]
        );
    }

    #[test]
    fn test_json_keys() {
        assert_eq!(
            keys("reviews.json"),
            vec![
                ("processed_reviews.json".to_string(), ArtifactEncoding::Json),
                ("processed_reviews.parquet".to_string(), ArtifactEncoding::Parquet),
            ]
        );
    }

    #[test]
    fn test_pdf_keys() {
        assert_eq!(
            keys("report_2023.pdf"),
            vec![
                ("processed_report_2023.json".to_string(), ArtifactEncoding::Json),
                ("processed_report_2023.csv".to_string(), ArtifactEncoding::Csv),
            ]
        );
    }

    #[test]
    fn test_original_extension_case_kept() {
        assert_eq!(keys("Sales.CSV")[0].0, "cleaned_Sales.CSV");
        assert_eq!(keys("Sales.CSV")[1].0, "cleaned_Sales.parquet");
        assert!(keys("notes.txt").is_empty());
    }
}
