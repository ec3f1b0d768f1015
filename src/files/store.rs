//! Document storage keyed by path
//!
//! The editor reads and writes whole documents through [`FileStore`], so the
//! session logic can be exercised against a temp directory or an in-memory
//! store without touching the user's files.

use crate::error::{Error, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Whole-document read/write by path.
pub trait FileStore {
    fn read(&self, path: &Path) -> Result<String>;

    /// Write raw bytes, used for packaged exports such as EPUB and DOCX.
    fn write_bytes(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.write_bytes(path, contents.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool;
}

/// [`FileStore`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStore;

impl FileStore for FsFileStore {
    fn read(&self, path: &Path) -> Result<String> {
        let contents = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Read {} ({} bytes)", path.display(), contents.len());
        Ok(contents)
    }

    /// Creates missing parent directories before writing.
    fn write_bytes(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                debug!("Creating directory: {}", dir.display());
                fs::create_dir_all(dir).map_err(|source| Error::FileWrite {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, contents).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("doc.md");
        let store = FsFileStore;

        assert!(!store.exists(&path));
        store.write(&path, "# Hello\n\n| A |\n|---|\n").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), "# Hello\n\n| A |\n|---|\n");
    }

    #[test]
    fn test_write_bytes_keeps_binary_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.bin");
        let bytes = [0x50, 0x4b, 0x03, 0x04, 0x00, 0xff];
        FsFileStore.write_bytes(&path, &bytes).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.md");
        match FsFileStore.read(&path) {
            Err(Error::FileRead { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let temp = TempDir::new().unwrap();
        assert!(!FsFileStore.exists(temp.path()));
        assert!(matches!(
            FsFileStore.write(temp.path(), "x"),
            Err(Error::FileWrite { .. })
        ));
    }
}
