//! Word (DOCX) export
//!
//! Walks the owned markdown tree and writes WordprocessingML directly:
//! headings map to `HeadingN` styles, lists to hanging-indent paragraphs
//! with a marker, tables to `w:tbl`, and links to external hyperlink
//! relationships. Images are reduced to their alt text.

use super::html::html_escape;
use super::options::{ExportFormat, ExportOptions};
use super::package::Package;
use crate::error::Result;
use crate::markdown::{parse_tree, MarkdownNode, MarkdownNodeType};
use crate::table::Alignment;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CODE_FONT: &str = "Consolas";

/// Half-point sizes for heading levels 1 through 6.
const HEADING_SIZES: [u32; 6] = [48, 36, 30, 26, 24, 22];

/// Twips per list level.
const LIST_INDENT: u32 = 720;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
</Types>
"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
</Relationships>
"#;

/// Generate a DOCX package from markdown content.
pub fn generate_docx(markdown: &str, options: &ExportOptions) -> Result<Vec<u8>> {
    let mut writer = DocxWriter::default();
    writer.write_blocks(&parse_tree(markdown).children, BlockContext::default());

    let mut package = Package::new(ExportFormat::Docx);
    package.add("[Content_Types].xml", CONTENT_TYPES)?;
    package.add("_rels/.rels", PACKAGE_RELS)?;
    package.add("docProps/core.xml", &core_properties(options))?;
    package.add("word/document.xml", &document_xml(&writer.body))?;
    package.add("word/styles.xml", &styles_xml())?;
    package.add("word/_rels/document.xml.rels", &document_rels(&writer.links))?;
    package.finish()
}

// ─────────────────────────────────────────────────────────────────────────────
// Package parts
// ─────────────────────────────────────────────────────────────────────────────

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORD_NS}" xmlns:r="{REL_NS}">
<w:body>
{body}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>
</w:body>
</w:document>
"#
    )
}

fn document_rels(links: &[String]) -> String {
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
"#,
    );
    for (index, url) in links.iter().enumerate() {
        rels.push_str(&format!(
            "  <Relationship Id=\"{}\" Type=\"{}/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>\n",
            link_id(index),
            REL_NS,
            html_escape(url)
        ));
    }
    rels.push_str("</Relationships>\n");
    rels
}

fn core_properties(options: &ExportOptions) -> String {
    let author = options.author.trim();
    let creator = if author.is_empty() {
        String::new()
    } else {
        format!("\n  <dc:creator>{}</dc:creator>", html_escape(author))
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>{}</dc:title>{}
</cp:coreProperties>
"#,
        html_escape(options.display_title()),
        creator
    )
}

fn styles_xml() -> String {
    let mut styles = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{WORD_NS}">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr></w:style>
"#
    );
    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        styles.push_str(&format!(
            "  <w:style w:type=\"paragraph\" w:styleId=\"Heading{level}\"><w:name w:val=\"heading {level}\"/><w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"120\"/><w:outlineLvl w:val=\"{index}\"/></w:pPr><w:rPr><w:b/><w:sz w:val=\"{size}\"/></w:rPr></w:style>\n"
        ));
    }
    styles.push_str(&format!(
        r#"  <w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="{LIST_INDENT}"/></w:pPr><w:rPr><w:i/><w:color w:val="59636E"/></w:rPr></w:style>
  <w:style w:type="paragraph" w:styleId="Code"><w:name w:val="Code"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr><w:rPr><w:rFonts w:ascii="{CODE_FONT}" w:hAnsi="{CODE_FONT}" w:cs="{CODE_FONT}"/><w:sz w:val="20"/></w:rPr></w:style>
  <w:style w:type="character" w:styleId="Hyperlink"><w:name w:val="Hyperlink"/><w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr></w:style>
</w:styles>
"#
    ));
    styles
}

fn link_id(index: usize) -> String {
    format!("rIdLink{}", index + 1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Body writer
// ─────────────────────────────────────────────────────────────────────────────

/// Where a block sits: inside a quote, and how deep in lists.
#[derive(Debug, Clone, Copy, Default)]
struct BlockContext {
    quote: bool,
    list_depth: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
    link: bool,
    superscript: bool,
}

#[derive(Debug, Default)]
struct DocxWriter {
    body: String,
    /// Hyperlink targets, in relationship order
    links: Vec<String>,
}

impl DocxWriter {
    fn write_blocks(&mut self, nodes: &[MarkdownNode], context: BlockContext) {
        for node in nodes {
            self.write_block(node, context);
        }
    }

    fn write_block(&mut self, node: &MarkdownNode, context: BlockContext) {
        match &node.node_type {
            MarkdownNodeType::Paragraph => {
                let runs = self.inline_runs(&node.children, RunStyle::default());
                self.push_paragraph(&paragraph_properties(None, context, false), &runs);
            }
            MarkdownNodeType::Heading { level } => {
                let runs = self.inline_runs(&node.children, RunStyle::default());
                let style = format!("Heading{}", level);
                self.push_paragraph(&paragraph_properties(Some(&style), context, false), &runs);
            }
            MarkdownNodeType::BlockQuote => {
                let inner = BlockContext {
                    quote: true,
                    ..context
                };
                self.write_blocks(&node.children, inner);
            }
            MarkdownNodeType::List { ordered, start } => {
                let inner = BlockContext {
                    list_depth: context.list_depth + 1,
                    ..context
                };
                for (index, item) in node.children.iter().enumerate() {
                    let marker = list_marker(*ordered, start + index, &item.node_type);
                    self.write_list_item(item, &marker, inner);
                }
            }
            MarkdownNodeType::Item | MarkdownNodeType::TaskItem { .. } => {
                let inner = BlockContext {
                    list_depth: context.list_depth + 1,
                    ..context
                };
                let marker = list_marker(false, 1, &node.node_type);
                self.write_list_item(node, &marker, inner);
            }
            MarkdownNodeType::CodeBlock { literal, .. } => {
                self.write_code_lines(literal, context);
            }
            MarkdownNodeType::HtmlBlock(html) => {
                self.write_code_lines(html, context);
            }
            MarkdownNodeType::ThematicBreak => {
                self.body.push_str(
                    "<w:p><w:pPr><w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"auto\"/></w:pBdr></w:pPr></w:p>\n",
                );
            }
            MarkdownNodeType::Table { alignments } => self.write_table(node, alignments),
            MarkdownNodeType::FootnoteDefinition(name) => {
                let label = run(&format!("[{}] ", name), RunStyle::default());
                self.push_paragraph(&paragraph_properties(None, context, false), &label);
                self.write_blocks(&node.children, context);
            }
            _ if node.is_block() || node.children.iter().any(MarkdownNode::is_block) => {
                self.write_blocks(&node.children, context);
            }
            // Stray inline content at block level
            _ => {
                let runs = self.inline_runs(std::slice::from_ref(node), RunStyle::default());
                if !runs.is_empty() {
                    self.push_paragraph(&paragraph_properties(None, context, false), &runs);
                }
            }
        }
    }

    /// The first paragraph carries the marker on a hanging indent; later
    /// blocks of the item line up with its text.
    fn write_list_item(&mut self, item: &MarkdownNode, marker: &str, context: BlockContext) {
        let marker_runs = format!(
            "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r><w:r><w:tab/></w:r>",
            html_escape(marker)
        );
        let mut children = item.children.iter();
        match children.next() {
            Some(first) if first.node_type == MarkdownNodeType::Paragraph => {
                let runs = self.inline_runs(&first.children, RunStyle::default());
                self.push_paragraph(
                    &paragraph_properties(None, context, true),
                    &format!("{}{}", marker_runs, runs),
                );
            }
            Some(first) => {
                self.push_paragraph(&paragraph_properties(None, context, true), &marker_runs);
                self.write_block(first, context);
            }
            None => {
                self.push_paragraph(&paragraph_properties(None, context, true), &marker_runs);
            }
        }
        for child in children {
            self.write_block(child, context);
        }
    }

    fn write_code_lines(&mut self, literal: &str, context: BlockContext) {
        let code = RunStyle {
            code: true,
            ..RunStyle::default()
        };
        let properties = paragraph_properties(Some("Code"), context, false);
        for line in literal.trim_end_matches('\n').split('\n') {
            self.push_paragraph(&properties, &run(line.trim_end_matches('\r'), code));
        }
    }

    fn write_table(&mut self, table: &MarkdownNode, alignments: &[Alignment]) {
        self.body.push_str(
            "<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/><w:tblBorders>\
             <w:top w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             <w:left w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             <w:bottom w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             <w:right w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             <w:insideH w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             <w:insideV w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"D0D7DE\"/>\
             </w:tblBorders></w:tblPr>\n",
        );
        for row in &table.children {
            let header = matches!(row.node_type, MarkdownNodeType::TableRow { header: true });
            self.body.push_str("<w:tr>");
            if header {
                self.body.push_str("<w:trPr><w:tblHeader/></w:trPr>");
            }
            for (column, cell) in row.children.iter().enumerate() {
                let style = RunStyle {
                    bold: header,
                    ..RunStyle::default()
                };
                let runs = self.inline_runs(&cell.children, style);
                let justify = match alignments.get(column).copied().unwrap_or_default() {
                    Alignment::Left => "left",
                    Alignment::Center => "center",
                    Alignment::Right => "right",
                };
                self.body.push_str(&format!(
                    "<w:tc><w:p><w:pPr><w:spacing w:after=\"0\"/><w:jc w:val=\"{}\"/></w:pPr>{}</w:p></w:tc>",
                    justify, runs
                ));
            }
            self.body.push_str("</w:tr>\n");
        }
        self.body.push_str("</w:tbl>\n");
    }

    fn push_paragraph(&mut self, properties: &str, runs: &str) {
        self.body.push_str("<w:p>");
        self.body.push_str(properties);
        self.body.push_str(runs);
        self.body.push_str("</w:p>\n");
    }

    fn inline_runs(&mut self, nodes: &[MarkdownNode], style: RunStyle) -> String {
        let mut output = String::new();
        for node in nodes {
            self.write_inline(node, style, &mut output);
        }
        output
    }

    fn write_inline(&mut self, node: &MarkdownNode, style: RunStyle, output: &mut String) {
        match &node.node_type {
            MarkdownNodeType::Text(text) | MarkdownNodeType::HtmlInline(text) => {
                output.push_str(&run(text, style));
            }
            MarkdownNodeType::Code(code) => {
                let code_style = RunStyle { code: true, ..style };
                output.push_str(&run(code, code_style));
            }
            MarkdownNodeType::SoftBreak => output.push_str(&run(" ", style)),
            MarkdownNodeType::LineBreak => output.push_str("<w:r><w:br/></w:r>"),
            MarkdownNodeType::Emphasis => {
                let inner = RunStyle { italic: true, ..style };
                output.push_str(&self.inline_runs(&node.children, inner));
            }
            MarkdownNodeType::Strong => {
                let inner = RunStyle { bold: true, ..style };
                output.push_str(&self.inline_runs(&node.children, inner));
            }
            MarkdownNodeType::Strikethrough => {
                let inner = RunStyle { strike: true, ..style };
                output.push_str(&self.inline_runs(&node.children, inner));
            }
            MarkdownNodeType::Link { url, .. } => {
                self.links.push(url.clone());
                let id = link_id(self.links.len() - 1);
                let inner = RunStyle { link: true, ..style };
                let runs = self.inline_runs(&node.children, inner);
                output.push_str(&format!("<w:hyperlink r:id=\"{}\">{}</w:hyperlink>", id, runs));
            }
            MarkdownNodeType::Image { url, .. } => {
                let alt = node.text_content();
                let label = if alt.trim().is_empty() { url.as_str() } else { alt.as_str() };
                output.push_str(&run(&format!("[{}]", label), style));
            }
            MarkdownNodeType::FootnoteReference(name) => {
                let inner = RunStyle {
                    superscript: true,
                    ..style
                };
                output.push_str(&run(&format!("[{}]", name), inner));
            }
            _ => output.push_str(&self.inline_runs(&node.children, style)),
        }
    }
}

fn paragraph_properties(style: Option<&str>, context: BlockContext, hanging: bool) -> String {
    let style = style.or(context.quote.then_some("Quote"));
    let mut properties = String::new();
    if let Some(style) = style {
        properties.push_str(&format!("<w:pStyle w:val=\"{}\"/>", style));
    }
    if context.list_depth > 0 {
        let left = LIST_INDENT * context.list_depth;
        if hanging {
            properties.push_str(&format!("<w:ind w:left=\"{}\" w:hanging=\"360\"/>", left));
        } else {
            properties.push_str(&format!("<w:ind w:left=\"{}\"/>", left));
        }
    }
    if properties.is_empty() {
        properties
    } else {
        format!("<w:pPr>{}</w:pPr>", properties)
    }
}

fn list_marker(ordered: bool, number: usize, item: &MarkdownNodeType) -> String {
    match item {
        MarkdownNodeType::TaskItem { checked: true } => "\u{2612}".to_string(),
        MarkdownNodeType::TaskItem { checked: false } => "\u{2610}".to_string(),
        _ if ordered => format!("{}.", number),
        _ => "\u{2022}".to_string(),
    }
}

fn run(text: &str, style: RunStyle) -> String {
    let mut properties = String::new();
    if style.link {
        properties.push_str("<w:rStyle w:val=\"Hyperlink\"/>");
    }
    if style.code {
        properties.push_str(&format!(
            "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\"/>",
            CODE_FONT
        ));
    }
    if style.bold {
        properties.push_str("<w:b/>");
    }
    if style.italic {
        properties.push_str("<w:i/>");
    }
    if style.strike {
        properties.push_str("<w:strike/>");
    }
    if style.superscript {
        properties.push_str("<w:vertAlign w:val=\"superscript\"/>");
    }
    let properties = if properties.is_empty() {
        properties
    } else {
        format!("<w:rPr>{}</w:rPr>", properties)
    };
    format!(
        "<w:r>{}<w:t xml:space=\"preserve\">{}</w:t></w:r>",
        properties,
        html_escape(text)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
