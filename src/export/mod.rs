//! Document Export Module for Quillpad
//!
//! Renders the current markdown document to a file in the chosen format.
//!
//! # Supported Export Formats
//!
//! - **HTML**: Complete HTML document with inlined CSS and metadata
//! - **Clipboard HTML**: Rendered fragment copied for pasting in other apps
//! - **EPUB**: EPUB 3 package with one XHTML chapter
//! - **DOCX**: Word document built from the markdown tree
//! - **PDF**: Listed in the menu; reported as unsupported rather than
//!   writing a broken file
//!
//! # Architecture
//!
//! - `options.rs` - Export formats and metadata
//! - `html.rs` - HTML document generation
//! - `epub.rs` / `docx.rs` - Zipped document packages
//! - `package.rs` - Zip writer shared by the packaged formats
//! - `clipboard.rs` - Platform clipboard operations

mod clipboard;
mod docx;
mod epub;
mod html;
mod options;
mod package;

pub use clipboard::{copy_html_to_clipboard, copy_text_to_clipboard};
pub use docx::generate_docx;
pub use epub::generate_epub;
pub use html::{generate_html_document, generate_html_fragment};
pub use options::{ExportFormat, ExportOptions};

use crate::error::{Error, Result};
use crate::files::FileStore;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Path of the written file on success.
pub type ExportOutcome = Result<PathBuf>;

/// Export `markdown` to `path` in `format`.
pub fn export_document(
    store: &dyn FileStore,
    markdown: &str,
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportOutcome {
    let contents = match format {
        ExportFormat::Html => generate_html_document(markdown, options).into_bytes(),
        ExportFormat::Epub => generate_epub(markdown, options)?,
        ExportFormat::Docx => generate_docx(markdown, options)?,
        ExportFormat::Pdf => {
            warn!("{} export requested but not available", format.label());
            return Err(Error::Export {
                format: format.label().to_string(),
                message: "this format is not supported in this build".to_string(),
            });
        }
    };

    store.write_bytes(path, &contents).map_err(|e| Error::Export {
        format: format.label().to_string(),
        message: e.to_string(),
    })?;
    info!("Exported {} to {}", format.label(), path.display());
    Ok(path.to_path_buf())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::package::tests::{open_archive, read_part};
    use crate::files::FsFileStore;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_export_html_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.html");
        let options = ExportOptions {
            title: "Report".to_string(),
            ..ExportOptions::default()
        };

        let written =
            export_document(&FsFileStore, "# Report", &path, ExportFormat::Html, &options).unwrap();
        assert_eq!(written, path);
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>Report</title>"));
    }

    #[test]
    fn test_pdf_fails_without_writing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.pdf");
        let err = export_document(
            &FsFileStore,
            "text",
            &path,
            ExportFormat::Pdf,
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Export { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_epub_writes_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.epub");
        let options = ExportOptions {
            title: "Report".to_string(),
            ..ExportOptions::default()
        };
        let markdown = "# Report\n\n| A | B |\n| --- | --- |\n| 1 | 2 |";

        export_document(&FsFileStore, markdown, &path, ExportFormat::Epub, &options).unwrap();
        let mut archive = open_archive(fs::read(&path).unwrap());
        assert_eq!(archive.by_index(0).unwrap().name(), "mimetype");
        let chapter = read_part(&mut archive, "OEBPS/chapter.xhtml");
        assert!(chapter.contains("<td>2</td>"));
    }

    #[test]
    fn test_export_docx_writes_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.docx");
        let markdown = "# Report\n\n- first item";

        export_document(
            &FsFileStore,
            markdown,
            &path,
            ExportFormat::Docx,
            &ExportOptions::default(),
        )
        .unwrap();
        let mut archive = open_archive(fs::read(&path).unwrap());
        let document = read_part(&mut archive, "word/document.xml");
        assert!(document.contains(">Report</w:t>"));
        assert!(document.contains(">first item</w:t>"));
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }

    #[test]
    fn test_write_failure_is_export_error() {
        let temp = TempDir::new().unwrap();
        // The target is an existing directory
        let err = export_document(
            &FsFileStore,
            "text",
            temp.path(),
            ExportFormat::Html,
            &ExportOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("HTML export failed"));
    }
}
