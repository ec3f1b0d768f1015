//! Standalone HTML document generation
//!
//! Wraps the rendered markdown in a complete HTML page with title and
//! author metadata and an inlined stylesheet, so the file opens correctly
//! without any companion assets.

use super::options::ExportOptions;
use crate::markdown::render_html;

/// Generate a complete HTML document from markdown content.
pub fn generate_html_document(markdown: &str, options: &ExportOptions) -> String {
    let body = render_html(markdown);
    let author_meta = if options.author.trim().is_empty() {
        String::new()
    } else {
        format!(
            "\n    <meta name=\"author\" content=\"{}\">",
            html_escape(options.author.trim())
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Quillpad">{author_meta}
    <title>{title}</title>
    <style>
{base_css}
{user_css}
    </style>
</head>
<body>
    <article class="document">
{body}
    </article>
</body>
</html>"#,
        author_meta = author_meta,
        title = html_escape(options.display_title()),
        base_css = BASE_CSS,
        user_css = sanitize_css(&options.style_css),
        body = body,
    )
}

/// HTML fragment (no doctype or head) for pasting into other applications.
pub fn generate_html_fragment(markdown: &str) -> String {
    render_html(markdown)
}

// ─────────────────────────────────────────────────────────────────────────────
// Styling
// ─────────────────────────────────────────────────────────────────────────────

pub(super) const BASE_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
    color: #1f2328;
    background: #ffffff;
}
.document { max-width: 860px; margin: 0 auto; padding: 32px 24px; }
.document h1, .document h2 { border-bottom: 1px solid #d0d7de; padding-bottom: 0.3em; }
.document code {
    font-family: 'JetBrains Mono', Consolas, monospace;
    font-size: 0.9em;
    background: #f3f4f6;
    padding: 0.15em 0.35em;
    border-radius: 4px;
}
.document pre { background: #f6f8fa; padding: 16px; overflow: auto; border-radius: 6px; }
.document pre code { background: transparent; padding: 0; }
.document blockquote { margin: 0 0 16px; padding: 0 1em; color: #59636e; border-left: 4px solid #d0d7de; }
.document table { border-collapse: collapse; margin-bottom: 16px; }
.document th, .document td { border: 1px solid #d0d7de; padding: 6px 12px; }
.document th { background: #f6f8fa; font-weight: 600; }
.document img { max-width: 100%; }
"#;

/// User CSS is inlined in a `<style>` element; a literal closing tag would
/// end it early.
fn sanitize_css(css: &str) -> String {
    css.replace("</style", "<\\/style")
}

/// HTML-escape a string.
pub(super) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn options(title: &str, author: &str, css: &str) -> ExportOptions {
        ExportOptions {
            title: title.to_string(),
            author: author.to_string(),
            style_css: css.to_string(),
        }
    }

    #[test]
    fn test_generate_html_document() {
        let html = generate_html_document(
            "# Test\n\n| A |\n| -------- |\n| 1 |",
            &options("Test Doc", "Ada", "h1 { color: teal; }"),
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Test Doc</title>"));
        assert!(html.contains("<meta name=\"author\" content=\"Ada\">"));
        assert!(html.contains("h1 { color: teal; }"));
        assert!(html.contains("<table>"));
        assert!(html.contains("</article>"));
    }

    #[test]
    fn test_metadata_is_escaped() {
        let html = generate_html_document("", &options("<b>\"x\"</b>", "Tom & Jerry", ""));
        assert!(html.contains("<title>&lt;b&gt;&quot;x&quot;&lt;/b&gt;</title>"));
        assert!(html.contains("content=\"Tom &amp; Jerry\""));
    }

    #[test]
    fn test_missing_author_omits_meta() {
        let html = generate_html_document("text", &options("", "  ", ""));
        assert!(!html.contains("name=\"author\""));
        assert!(html.contains("<title>Untitled</title>"));
    }

    #[test]
    fn test_user_css_cannot_close_style() {
        let html = generate_html_document("", &options("t", "", "</style><script>x</script>"));
        assert!(!html.contains("</style><script>"));
    }

    #[test]
    fn test_generate_html_fragment() {
        let html = generate_html_fragment("**Bold** and *italic*");
        assert!(!html.contains("<!DOCTYPE"));
        assert!(html.contains("<strong>"));
        assert!(html.contains("<em>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("Hello"), "Hello");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("'q'"), "&#39;q&#39;");
    }
}
