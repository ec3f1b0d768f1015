//! Native file dialog integration using the rfd crate
//!
//! Blocking dialogs for opening and saving documents, picking a templates
//! folder, and choosing an export target.

use rfd::FileDialog;
use std::path::{Path, PathBuf};

/// File extension filters for supported file types.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

fn with_directory(dialog: FileDialog, initial_dir: Option<&Path>) -> FileDialog {
    match initial_dir {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}

/// Opens a native file dialog for selecting a document.
///
/// Returns `Some(PathBuf)` if a file was selected, `None` if cancelled.
pub fn open_file_dialog(initial_dir: Option<&Path>) -> Option<PathBuf> {
    let dialog = FileDialog::new()
        .set_title("Open Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("Text Files", TEXT_EXTENSIONS)
        .add_filter("All Files", &["*"]);
    with_directory(dialog, initial_dir).pick_file()
}

/// Opens a native save dialog for a document.
pub fn save_file_dialog(initial_dir: Option<&Path>, default_name: Option<&str>) -> Option<PathBuf> {
    let mut dialog = FileDialog::new()
        .set_title("Save Document")
        .add_filter("Markdown Files", MARKDOWN_EXTENSIONS)
        .add_filter("Text Files", TEXT_EXTENSIONS);
    if let Some(name) = default_name {
        dialog = dialog.set_file_name(name);
    }
    with_directory(dialog, initial_dir).save_file()
}

/// Opens a native folder picker.
pub fn open_folder_dialog(title: &str, initial_dir: Option<&Path>) -> Option<PathBuf> {
    with_directory(FileDialog::new().set_title(title), initial_dir).pick_folder()
}

/// Opens a save dialog filtered to one export format.
pub fn export_file_dialog(
    format_label: &str,
    extension: &str,
    initial_dir: Option<&Path>,
    default_name: &str,
) -> Option<PathBuf> {
    let dialog = FileDialog::new()
        .set_title(format!("Export as {}", format_label))
        .add_filter(format_label, &[extension])
        .set_file_name(format!("{}.{}", default_name, extension));
    with_directory(dialog, initial_dir).save_file()
}
