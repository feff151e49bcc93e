//! Directory scanning
//!
//! The scanner lists candidate files one at a time without touching their
//! content; `load_raw_file` reads one of them. The scan is a single pass;
//! rescanning means building a new scanner.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::RawFile;

/// Lazy iterator over the regular files directly inside a directory
pub struct DirectoryScanner {
    root: PathBuf,
    entries: walkdir::IntoIter,
}

impl DirectoryScanner {
    /// Start scanning `dir`; fails if it is not a readable directory
    pub fn new(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "data directory {} does not exist or is not a directory",
                dir.display()
            )));
        }

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            root: dir.to_path_buf(),
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for DirectoryScanner {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Some(Err(Error::FileRead { path, source }));
                }
            };

            if entry.file_type().is_file() {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// Read a scanned file. Unsupported files are returned without their content.
pub async fn load_raw_file(path: PathBuf) -> Result<RawFile> {
    let unread = RawFile::new(path, Vec::new());
    if !unread.kind().is_supported() {
        return Ok(unread);
    }

    let path = unread.path().to_path_buf();
    match tokio::fs::read(&path).await {
        Ok(content) => Ok(RawFile::new(path, content)),
        Err(source) => Err(Error::FileRead { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileKind;

    #[test]
    fn test_scan_lists_regular_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.JSON"), "[]").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.pdf"), "%PDF").unwrap();

        let names: Vec<String> = DirectoryScanner::new(dir.path())
            .unwrap()
            .map(|p| p.unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.JSON", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_load_reads_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let csv = load_raw_file(dir.path().join("a.csv")).await.unwrap();
        assert_eq!(csv.kind(), FileKind::Csv);
        assert_eq!(csv.content(), b"x\n1\n");

        let txt = load_raw_file(dir.path().join("notes.txt")).await.unwrap();
        assert_eq!(txt.kind(), FileKind::Unsupported);
        assert!(txt.content().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_raw_file(dir.path().join("gone.json")).await;
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_rescan_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();

        assert_eq!(DirectoryScanner::new(dir.path()).unwrap().count(), 1);
        assert_eq!(DirectoryScanner::new(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryScanner::new(&dir.path().join("absent"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
