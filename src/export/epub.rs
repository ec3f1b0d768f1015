//! EPUB 3 export
//!
//! The document becomes a single XHTML chapter rendered by comrak. The
//! package also holds a navigation document, the stylesheet and the OPF
//! metadata. `mimetype` must be the first entry and stored uncompressed so
//! readers can sniff the file type.

use super::html::{html_escape, BASE_CSS};
use super::options::{ExportFormat, ExportOptions};
use super::package::Package;
use crate::error::Result;
use crate::markdown::render_html;

const MIMETYPE: &str = "application/epub+zip";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Generate an EPUB package from markdown content.
pub fn generate_epub(markdown: &str, options: &ExportOptions) -> Result<Vec<u8>> {
    let title = html_escape(options.display_title());
    let mut package = Package::new(ExportFormat::Epub);
    package.add_stored("mimetype", MIMETYPE)?;
    package.add("META-INF/container.xml", CONTAINER_XML)?;
    package.add("OEBPS/content.opf", &content_opf(options))?;
    package.add("OEBPS/nav.xhtml", &nav_xhtml(&title))?;
    package.add("OEBPS/style.css", &stylesheet(options))?;
    package.add("OEBPS/chapter.xhtml", &chapter_xhtml(markdown, &title))?;
    package.finish()
}

fn content_opf(options: &ExportOptions) -> String {
    let author = options.author.trim();
    let creator = if author.is_empty() {
        String::new()
    } else {
        format!("\n    <dc:creator>{}</dc:creator>", html_escape(author))
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>en</dc:language>{creator}
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="style" href="style.css" media-type="text/css"/>
    <item id="chapter" href="chapter.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="chapter"/>
  </spine>
</package>
"#,
        identifier = identifier(options.display_title()),
        title = html_escape(options.display_title()),
        creator = creator,
    )
}

/// Stable identifier derived from the title, e.g. `urn:quillpad:my-notes`.
fn identifier(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "urn:quillpad:document".to_string()
    } else {
        format!("urn:quillpad:{}", slug)
    }
}

fn nav_xhtml(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head>
  <meta charset="UTF-8"/>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="toc">
    <ol>
      <li><a href="chapter.xhtml">{title}</a></li>
    </ol>
  </nav>
</body>
</html>
"#,
        title = title,
    )
}

fn stylesheet(options: &ExportOptions) -> String {
    format!("{}\n{}\n", BASE_CSS.trim(), options.style_css.trim())
}

fn chapter_xhtml(markdown: &str, title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="en" xml:lang="en">
<head>
  <meta charset="UTF-8"/>
  <title>{title}</title>
  <link rel="stylesheet" type="text/css" href="style.css"/>
</head>
<body>
<article class="document">
{body}
</article>
</body>
</html>
"#,
        title = title,
        body = render_html(markdown),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::package::tests::{open_archive, read_part};
    use zip::CompressionMethod;

    fn options(title: &str, author: &str) -> ExportOptions {
        ExportOptions {
            title: title.to_string(),
            author: author.to_string(),
            style_css: "h1 { color: teal; }".to_string(),
        }
    }

    #[test]
    fn test_mimetype_is_first_and_stored() {
        let bytes = generate_epub("text", &ExportOptions::default()).unwrap();
        let mut archive = open_archive(bytes);
        {
            let first = archive.by_index(0).unwrap();
            assert_eq!(first.name(), "mimetype");
            assert_eq!(first.compression(), CompressionMethod::Stored);
        }
        assert_eq!(read_part(&mut archive, "mimetype"), "application/epub+zip");
    }

    #[test]
    fn test_container_points_at_package_document() {
        let bytes = generate_epub("text", &ExportOptions::default()).unwrap();
        let mut archive = open_archive(bytes);
        let container = read_part(&mut archive, "META-INF/container.xml");
        assert!(container.contains(r#"full-path="OEBPS/content.opf""#));
        // Everything the manifest lists is in the archive
        for part in ["OEBPS/nav.xhtml", "OEBPS/style.css", "OEBPS/chapter.xhtml"] {
            assert!(archive.by_name(part).is_ok(), "missing {}", part);
        }
    }

    #[test]
    fn test_package_metadata() {
        let bytes = generate_epub("text", &options("Tom & Jerry", "Ada <Lovelace>")).unwrap();
        let mut archive = open_archive(bytes);
        let opf = read_part(&mut archive, "OEBPS/content.opf");
        assert!(opf.contains("<dc:title>Tom &amp; Jerry</dc:title>"));
        assert!(opf.contains("<dc:creator>Ada &lt;Lovelace&gt;</dc:creator>"));
        assert!(opf.contains("urn:quillpad:tom-jerry"));
        assert!(opf.contains(r#"<itemref idref="chapter"/>"#));
    }

    #[test]
    fn test_no_creator_without_author() {
        let bytes = generate_epub("text", &ExportOptions::default()).unwrap();
        let mut archive = open_archive(bytes);
        let opf = read_part(&mut archive, "OEBPS/content.opf");
        assert!(!opf.contains("dc:creator"));
        assert!(opf.contains("<dc:title>Untitled</dc:title>"));
    }

    #[test]
    fn test_chapter_holds_rendered_markdown() {
        let markdown = "# Plan\n\n| A | B |\n| --- | --: |\n| 1 | 2 |";
        let bytes = generate_epub(markdown, &options("Plan", "")).unwrap();
        let mut archive = open_archive(bytes);
        let chapter = read_part(&mut archive, "OEBPS/chapter.xhtml");
        assert!(chapter.contains("<title>Plan</title>"));
        assert!(chapter.contains("<h1"));
        assert!(chapter.contains("Plan</h1>"));
        assert!(chapter.contains("<table>"));
        assert!(chapter.contains(r#"href="style.css""#));

        let style = read_part(&mut archive, "OEBPS/style.css");
        assert!(style.contains("h1 { color: teal; }"));
    }

    #[test]
    fn test_identifier_slug() {
        assert_eq!(identifier("My  Notes!"), "urn:quillpad:my-notes");
        assert_eq!(identifier("???"), "urn:quillpad:document");
    }
}
