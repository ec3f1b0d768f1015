//! File operations module for Quillpad
//!
//! Document storage, template discovery, and native file dialogs.

pub mod dialogs;
mod store;
mod templates;

pub use store::{FileStore, FsFileStore};
pub use templates::{default_templates_dir, discover_templates, Template};
