//! Export formats and per-export options

use crate::config::ExportDefaults;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Export Format
// ─────────────────────────────────────────────────────────────────────────────

/// Document formats offered in the Export menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Standalone HTML file with embedded styles
    #[default]
    Html,
    Pdf,
    Epub,
    Docx,
}

impl ExportFormat {
    /// Get the display label for this format.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Html => "HTML",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Epub => "EPUB",
            ExportFormat::Docx => "Word (DOCX)",
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Epub => "epub",
            ExportFormat::Docx => "docx",
        }
    }

    /// Whether this build can write the format. Only PDF is missing.
    pub fn is_supported(&self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }

    /// Get all available export formats.
    pub fn all() -> &'static [ExportFormat] {
        &[
            ExportFormat::Html,
            ExportFormat::Pdf,
            ExportFormat::Epub,
            ExportFormat::Docx,
        ]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Options
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata and styling for one export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportOptions {
    /// Document title; empty falls back to "Untitled"
    pub title: String,
    pub author: String,
    /// CSS appended after the built-in stylesheet
    pub style_css: String,
}

impl ExportOptions {
    /// Options for a document titled `title`, with author and style from
    /// the saved export defaults.
    pub fn from_defaults(title: impl Into<String>, defaults: &ExportDefaults) -> Self {
        Self {
            title: title.into(),
            author: defaults.author.clone(),
            style_css: defaults.style_css.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled"
        } else {
            title
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
