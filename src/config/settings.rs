//! User settings and preferences for Quillpad
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Available color themes for the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    pub fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark, Theme::System]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View Mode Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// What the central area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Raw markdown text editing
    #[default]
    Editor,
    /// Rendered, read-only document
    Preview,
    /// Editor on the left, preview on the right
    Split,
}

impl ViewMode {
    /// Cycle Editor -> Split -> Preview -> Editor.
    pub fn next(&self) -> Self {
        match self {
            ViewMode::Editor => ViewMode::Split,
            ViewMode::Split => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Editor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Editor => "Editor",
            ViewMode::Preview => "Preview",
            ViewMode::Split => "Split",
        }
    }

    pub fn all() -> &'static [ViewMode] {
        &[ViewMode::Editor, ViewMode::Split, ViewMode::Preview]
    }

    pub fn shows_editor(&self) -> bool {
        !matches!(self, ViewMode::Preview)
    }

    pub fn shows_preview(&self) -> bool {
        !matches!(self, ViewMode::Editor)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions and maximized state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 760.0,
            maximized: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// New Table Size
// ─────────────────────────────────────────────────────────────────────────────

/// Dimensions used by "Insert Table".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSize {
    /// Data rows, not counting header and separator
    pub rows: usize,
    pub cols: usize,
}

impl Default for TableSize {
    fn default() -> Self {
        Self { rows: 2, cols: 3 }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Remembered export preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExportDefaults {
    /// Author written into exported document metadata
    pub author: String,
    /// Extra CSS appended to the built-in export stylesheet
    pub style_css: String,
    /// Open the exported file with the system handler afterwards
    pub open_after_export: bool,
    /// Last directory used for export
    pub last_directory: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Appearance
    // ─────────────────────────────────────────────────────────────────────────
    /// Color theme (light, dark, or system)
    pub theme: Theme,

    /// Font size for the editor (in points)
    pub font_size: f32,

    /// Whether to show line numbers in the status bar position readout
    pub show_line_numbers: bool,

    /// Editor, rendered preview, or both side by side
    pub view_mode: ViewMode,

    // ─────────────────────────────────────────────────────────────────────────
    // Editor Behavior
    // ─────────────────────────────────────────────────────────────────────────
    /// Whether to enable word wrap
    pub word_wrap: bool,

    /// Size of tables created with "Insert Table"
    pub default_table: TableSize,

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────
    /// Recently opened files (most recent first)
    pub recent_files: Vec<PathBuf>,

    /// Recently used folders (most recent first)
    pub recent_folders: Vec<PathBuf>,

    /// Maximum number of entries kept in each recent list
    pub max_recent: usize,

    /// Folder scanned for document templates
    pub templates_dir: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────
    pub export: ExportDefaults,

    // ─────────────────────────────────────────────────────────────────────────
    // Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Window size
    pub window_size: WindowSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Appearance
            theme: Theme::default(),
            font_size: 14.0,
            show_line_numbers: true,
            view_mode: ViewMode::default(),

            // Editor Behavior
            word_wrap: true,
            default_table: TableSize::default(),

            // History
            recent_files: Vec::new(),
            recent_folders: Vec::new(),
            max_recent: 10,
            templates_dir: None,

            // Export
            export: ExportDefaults::default(),

            // Window State
            window_size: WindowSize::default(),
        }
    }
}

/// Move `path` to the front of `list`, dropping duplicates and the overflow.
fn push_recent(list: &mut Vec<PathBuf>, path: PathBuf, max: usize) {
    list.retain(|p| p != &path);
    list.insert(0, path);
    list.truncate(max);
}

impl Settings {
    /// Add a file to the recent files list.
    ///
    /// If the file already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent`.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        push_recent(&mut self.recent_files, path, self.max_recent);
    }

    /// Add a folder to the recent folders list, same rules as files.
    pub fn add_recent_folder(&mut self, path: PathBuf) {
        push_recent(&mut self.recent_folders, path, self.max_recent);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    /// Largest table "Insert Table" will generate in either direction.
    pub const MAX_TABLE_DIMENSION: usize = 50;
    /// Upper bound for `max_recent`.
    pub const MAX_RECENT_LIMIT: usize = 100;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);

        self.default_table.rows = self
            .default_table
            .rows
            .clamp(1, Self::MAX_TABLE_DIMENSION);
        self.default_table.cols = self
            .default_table
            .cols
            .clamp(1, Self::MAX_TABLE_DIMENSION);

        if self.max_recent == 0 {
            self.max_recent = 10;
        } else if self.max_recent > Self::MAX_RECENT_LIMIT {
            self.max_recent = Self::MAX_RECENT_LIMIT;
        }
        self.recent_files.truncate(self.max_recent);
        self.recent_folders.truncate(self.max_recent);
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
