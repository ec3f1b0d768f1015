//! Clipboard export using arboard
//!
//! Clipboard tests need a display server, so only the pure parts are tested
//! here.

use super::html::generate_html_fragment;
use crate::error::{Error, Result};
use arboard::Clipboard;
use log::info;

/// Render `markdown` and place it on the clipboard as HTML, with the
/// markdown source as the plain-text alternative.
pub fn copy_html_to_clipboard(markdown: &str) -> Result<()> {
    let html = generate_html_fragment(markdown);
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard.set_html(html.as_str(), Some(markdown))?;
    info!("Copied {} bytes of HTML to the clipboard", html.len());
    Ok(())
}

/// Copy plain text to the clipboard.
pub fn copy_text_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
    clipboard.set_text(text)?;
    Ok(())
}
