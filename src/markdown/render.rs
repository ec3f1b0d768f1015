//! Markdown to HTML rendering using comrak
//!
//! GitHub Flavored Markdown with tables, strikethrough, task lists,
//! autolinks and footnotes. Raw HTML is passed through only when the caller
//! asks for it.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{markdown_to_html, parse_document, Arena, Options};

/// Rendering switches exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass raw HTML and unsafe link schemes through unchanged
    pub allow_raw_html: bool,
    /// Emit `id` attributes on headings
    pub header_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: false,
            header_ids: true,
        }
    }
}

impl RenderOptions {
    pub(super) fn to_comrak_options(self) -> Options {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = self.header_ids.then(String::new);
        options.render.unsafe_ = self.allow_raw_html;
        options
    }
}

/// Render `markdown` to an HTML fragment with default options.
pub fn render_html(markdown: &str) -> String {
    render_html_with(markdown, RenderOptions::default())
}

pub fn render_html_with(markdown: &str, options: RenderOptions) -> String {
    markdown_to_html(markdown, &options.to_comrak_options())
}

fn collect_text<'a>(node: &'a AstNode<'a>, output: &mut String) {
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(text) => output.push_str(text),
            NodeValue::Code(code) => output.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => output.push(' '),
            _ => {}
        }
    }
}

/// Plain text of the first level-1 heading, used as a default export title.
pub fn first_heading(markdown: &str) -> Option<String> {
    let arena = Arena::new();
    let options = RenderOptions::default().to_comrak_options();
    let root = parse_document(&arena, markdown, &options);

    let heading = root.children().find(|node| {
        matches!(&node.data.borrow().value, NodeValue::Heading(h) if h.level == 1)
    })?;
    let mut title = String::new();
    collect_text(heading, &mut title);
    let title = title.trim().to_string();
    (!title.is_empty()).then_some(title)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
