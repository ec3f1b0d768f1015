//! Markdown rendering and formatting
//!
//! - `render.rs` - HTML rendering through comrak
//! - `tree.rs` - Owned syntax tree for the preview pane and DOCX export
//! - `formatting.rs` - Raw-text formatting commands (bold, headings, lists, ...)

pub mod formatting;
mod render;
mod tree;

pub use formatting::{apply_format, FormatCommand, FormatResult};
pub use render::{first_heading, render_html, render_html_with, RenderOptions};
pub use tree::{parse_tree, MarkdownNode, MarkdownNodeType};
