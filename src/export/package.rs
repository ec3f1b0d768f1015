//! Zip packaging shared by the EPUB and DOCX writers

use super::options::ExportFormat;
use crate::error::{Error, Result};
use std::fmt::Display;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An in-memory zip archive being filled part by part.
pub(super) struct Package {
    format: ExportFormat,
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl Package {
    pub(super) fn new(format: ExportFormat) -> Self {
        Self {
            format,
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add an uncompressed part.
    pub(super) fn add_stored(&mut self, name: &str, contents: &str) -> Result<()> {
        self.add_with(name, contents, CompressionMethod::Stored)
    }

    /// Add a deflated part.
    pub(super) fn add(&mut self, name: &str, contents: &str) -> Result<()> {
        self.add_with(name, contents, CompressionMethod::Deflated)
    }

    fn add_with(&mut self, name: &str, contents: &str, method: CompressionMethod) -> Result<()> {
        let format = self.format;
        let options = SimpleFileOptions::default().compression_method(method);
        self.zip
            .start_file(name, options)
            .map_err(|e| failure(format, e))?;
        self.zip
            .write_all(contents.as_bytes())
            .map_err(|e| failure(format, e))?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub(super) fn finish(self) -> Result<Vec<u8>> {
        let format = self.format;
        let cursor = self.zip.finish().map_err(|e| failure(format, e))?;
        Ok(cursor.into_inner())
    }
}

fn failure(format: ExportFormat, err: impl Display) -> Error {
    Error::Export {
        format: format.label().to_string(),
        message: err.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
