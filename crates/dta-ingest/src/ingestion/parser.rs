//! Extension-based dispatch to the per-kind handlers

use super::{CsvCleaner, JsonNormalizer, PdfExtractor};
use crate::error::{Error, Result};
use crate::types::{FileKind, NormalizedTable, RawFile};

/// Routes a raw file to the handler for its kind
pub struct FileParser;

impl FileParser {
    /// Turn a raw file into a table using the handler for its extension
    pub fn parse(raw: &RawFile) -> Result<NormalizedTable> {
        match raw.kind() {
            FileKind::Csv => CsvCleaner::clean(raw),
            FileKind::Json => JsonNormalizer::normalize(raw),
            FileKind::Pdf => PdfExtractor::extract(raw),
            FileKind::Unsupported => Err(Error::UnsupportedFileType(
                raw.path()
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_else(|| raw.filename()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_extension() {
        let csv = RawFile::from_bytes("A.CSV", b"x\n1\n".to_vec());
        assert_eq!(FileParser::parse(&csv).unwrap().column_names(), vec!["x"]);

        let json = RawFile::from_bytes("r.json", b"[{\"text\": \"hi\"}]".to_vec());
        assert!(FileParser::parse(&json).unwrap().column_index("sentiment_score").is_some());
    }

    #[test]
    fn test_unsupported_extension() {
        let raw = RawFile::from_bytes("notes.txt", b"hello".to_vec());
        match FileParser::parse(&raw) {
            Err(Error::UnsupportedFileType(ext)) => assert_eq!(ext, "txt"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
