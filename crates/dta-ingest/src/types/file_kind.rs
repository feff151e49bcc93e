//! Raw input files and their kinds

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Kind of a raw input file, inferred from its extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Tabular data (.csv)
    Csv,
    /// Semi-structured records (.json)
    Json,
    /// Document with text content (.pdf)
    Pdf,
    /// Anything else
    Unsupported,
}

impl FileKind {
    /// Detect file kind from extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "csv" => Self::Csv,
            "json" => Self::Json,
            "pdf" => Self::Pdf,
            _ => Self::Unsupported,
        }
    }

    /// Detect file kind from a path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unsupported)
    }

    /// Check if a handler exists for this kind
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Pdf => "PDF",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A file discovered by the scanner. Never mutated after discovery.
#[derive(Debug, Clone)]
pub struct RawFile {
    path: PathBuf,
    kind: FileKind,
    content: Vec<u8>,
}

impl RawFile {
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        let kind = FileKind::from_path(&path);
        Self { path, kind, content }
    }

    /// Build an in-memory file, mostly useful for tests and tooling
    pub fn from_bytes(filename: &str, content: impl Into<Vec<u8>>) -> Self {
        Self::new(PathBuf::from(filename), content.into())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// File name including extension
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its final extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// SHA-256 of the content, hex encoded
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.content);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_extension("csv"), FileKind::Csv);
        assert_eq!(FileKind::from_extension("JSON"), FileKind::Json);
        assert_eq!(FileKind::from_extension("Pdf"), FileKind::Pdf);
        assert_eq!(FileKind::from_extension("xlsx"), FileKind::Unsupported);
        assert_eq!(FileKind::from_path(Path::new("notes")), FileKind::Unsupported);
    }

    #[test]
    fn test_raw_file_names() {
        let raw = RawFile::from_bytes("data/Sales Report.CSV", b"a,b\n1,2\n".to_vec());
        assert_eq!(raw.kind(), FileKind::Csv);
        assert_eq!(raw.filename(), "Sales Report.CSV");
        assert_eq!(raw.stem(), "Sales Report");
        assert_eq!(raw.size(), 8);
        assert_eq!(raw.content_hash().len(), 64);
    }
}
