//! Document templates
//!
//! A template is any markdown file under the templates folder. Nested
//! folders are scanned too; the template name is the path relative to the
//! folder, without extension.

use crate::error::Result;
use crate::files::FileStore;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions treated as markdown templates.
const TEMPLATE_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Deepest folder level scanned below the templates folder.
const MAX_TEMPLATE_DEPTH: usize = 4;

/// A discovered template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Display name, e.g. `meetings/weekly`
    pub name: String,
    pub path: PathBuf,
}

impl Template {
    /// Read the template body.
    pub fn load(&self, store: &dyn FileStore) -> Result<String> {
        store.read(&self.path)
    }
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List templates under `dir`, sorted by name.
///
/// A missing folder yields an empty list; unreadable entries are skipped.
pub fn discover_templates(dir: &Path) -> Vec<Template> {
    if !dir.is_dir() {
        debug!("Templates folder {} does not exist", dir.display());
        return Vec::new();
    }

    let mut templates: Vec<Template> = WalkDir::new(dir)
        .max_depth(MAX_TEMPLATE_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping template entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_template_file(entry.path()))
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(dir).ok()?.with_extension("");
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            Some(Template {
                name,
                path: entry.into_path(),
            })
        })
        .collect();

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Found {} template(s) in {}", templates.len(), dir.display());
    templates
}

/// Default templates folder: `<config dir>/templates`.
pub fn default_templates_dir() -> Option<PathBuf> {
    crate::config::get_config_dir()
        .ok()
        .map(|dir| dir.join("templates"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
