//! Owned markdown syntax tree
//!
//! comrak's AST borrows from an arena that only lives as long as the parse.
//! [`parse_tree`] copies it into plain owned nodes, which the preview pane
//! and the DOCX writer walk afterwards.

use super::render::RenderOptions;
use crate::table::Alignment;
use comrak::nodes::{
    AstNode, ListType as ComrakListType, NodeValue, TableAlignment as ComrakTableAlignment,
};
use comrak::{parse_document, Arena};

/// Represents the type of a markdown node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownNodeType {
    /// Root document node
    Document,
    BlockQuote,
    /// List container; `start` is the first number of an ordered list
    List { ordered: bool, start: usize },
    Item,
    /// List item opened with `[ ]` or `[x]`
    TaskItem { checked: bool },
    CodeBlock { info: String, literal: String },
    HtmlBlock(String),
    Paragraph,
    /// Heading, level 1 to 6
    Heading { level: u8 },
    ThematicBreak,
    /// Table; `None` alignments from comrak read as `Left`
    Table { alignments: Vec<Alignment> },
    TableRow { header: bool },
    TableCell,
    Text(String),
    SoftBreak,
    LineBreak,
    /// Inline code
    Code(String),
    HtmlInline(String),
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String, title: String },
    FootnoteReference(String),
    FootnoteDefinition(String),
    /// Constructs with no dedicated representation (front matter, math, ...)
    Other,
}

/// A node in the markdown tree with its source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownNode {
    pub node_type: MarkdownNodeType,
    pub children: Vec<MarkdownNode>,
    /// Start line in source (1-indexed)
    pub start_line: usize,
    /// End line in source (1-indexed)
    pub end_line: usize,
}

impl MarkdownNode {
    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.node_type {
            MarkdownNodeType::Text(t) | MarkdownNodeType::Code(t) => output.push_str(t),
            MarkdownNodeType::SoftBreak => output.push(' '),
            MarkdownNodeType::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Whether this node starts a block (as opposed to inline content).
    pub fn is_block(&self) -> bool {
        matches!(
            self.node_type,
            MarkdownNodeType::Document
                | MarkdownNodeType::BlockQuote
                | MarkdownNodeType::List { .. }
                | MarkdownNodeType::Item
                | MarkdownNodeType::TaskItem { .. }
                | MarkdownNodeType::CodeBlock { .. }
                | MarkdownNodeType::HtmlBlock(_)
                | MarkdownNodeType::Paragraph
                | MarkdownNodeType::Heading { .. }
                | MarkdownNodeType::ThematicBreak
                | MarkdownNodeType::Table { .. }
                | MarkdownNodeType::TableRow { .. }
                | MarkdownNodeType::TableCell
                | MarkdownNodeType::FootnoteDefinition(_)
        )
    }
}

/// Parse `markdown` into an owned tree rooted at a `Document` node.
///
/// Uses the same extensions as HTML rendering, so the preview and the
/// exports agree on what is a table, a task item or a footnote.
pub fn parse_tree(markdown: &str) -> MarkdownNode {
    let arena = Arena::new();
    let options = RenderOptions::default().to_comrak_options();
    let root = parse_document(&arena, markdown, &options);
    convert_node(root)
}

fn convert_node<'a>(node: &'a AstNode<'a>) -> MarkdownNode {
    let (node_type, sourcepos) = {
        let ast = node.data.borrow();
        (convert_node_value(&ast.value), ast.sourcepos)
    };
    MarkdownNode {
        node_type,
        children: node.children().map(convert_node).collect(),
        start_line: sourcepos.start.line,
        end_line: sourcepos.end.line,
    }
}

fn convert_alignment(alignment: ComrakTableAlignment) -> Alignment {
    match alignment {
        ComrakTableAlignment::Center => Alignment::Center,
        ComrakTableAlignment::Right => Alignment::Right,
        ComrakTableAlignment::Left | ComrakTableAlignment::None => Alignment::Left,
    }
}

fn convert_node_value(value: &NodeValue) -> MarkdownNodeType {
    match value {
        NodeValue::Document => MarkdownNodeType::Document,
        NodeValue::BlockQuote => MarkdownNodeType::BlockQuote,
        NodeValue::List(list) => MarkdownNodeType::List {
            ordered: matches!(list.list_type, ComrakListType::Ordered),
            start: list.start,
        },
        NodeValue::Item(_) => MarkdownNodeType::Item,
        NodeValue::TaskItem(mark) => MarkdownNodeType::TaskItem {
            checked: mark.is_some_and(|c| c == 'x' || c == 'X'),
        },
        NodeValue::CodeBlock(code) => MarkdownNodeType::CodeBlock {
            info: code.info.clone(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => MarkdownNodeType::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => MarkdownNodeType::Paragraph,
        NodeValue::Heading(heading) => MarkdownNodeType::Heading {
            level: heading.level.clamp(1, 6),
        },
        NodeValue::ThematicBreak => MarkdownNodeType::ThematicBreak,
        NodeValue::Table(table) => MarkdownNodeType::Table {
            alignments: table.alignments.iter().copied().map(convert_alignment).collect(),
        },
        NodeValue::TableRow(header) => MarkdownNodeType::TableRow { header: *header },
        NodeValue::TableCell => MarkdownNodeType::TableCell,
        NodeValue::Text(text) => MarkdownNodeType::Text(text.clone()),
        NodeValue::SoftBreak => MarkdownNodeType::SoftBreak,
        NodeValue::LineBreak => MarkdownNodeType::LineBreak,
        NodeValue::Code(code) => MarkdownNodeType::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => MarkdownNodeType::HtmlInline(html.clone()),
        NodeValue::Emph => MarkdownNodeType::Emphasis,
        NodeValue::Strong => MarkdownNodeType::Strong,
        NodeValue::Strikethrough => MarkdownNodeType::Strikethrough,
        NodeValue::Link(link) => MarkdownNodeType::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => MarkdownNodeType::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        NodeValue::FootnoteReference(reference) => {
            MarkdownNodeType::FootnoteReference(reference.name.clone())
        }
        NodeValue::FootnoteDefinition(definition) => {
            MarkdownNodeType::FootnoteDefinition(definition.name.clone())
        }
        _ => MarkdownNodeType::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn types(node: &MarkdownNode) -> Vec<&MarkdownNodeType> {
        node.children.iter().map(|child| &child.node_type).collect()
    }

    #[test]
    fn test_parse_empty_document() {
        let root = parse_tree("");
        assert_eq!(root.node_type, MarkdownNodeType::Document);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_parse_blocks_in_order() {
        let root = parse_tree("# Title\n\nSome text\n\n---\n\n> quoted");
        assert_eq!(
            types(&root),
            vec![
                &MarkdownNodeType::Heading { level: 1 },
                &MarkdownNodeType::Paragraph,
                &MarkdownNodeType::ThematicBreak,
                &MarkdownNodeType::BlockQuote,
            ]
        );
        assert_eq!(root.children[0].text_content(), "Title");
        assert_eq!((root.children[1].start_line, root.children[1].end_line), (3, 3));
    }

    #[test]
    fn test_parse_inline_styles() {
        let root = parse_tree("a **b** *c* ~~d~~ `e` [f](https://x.org)");
        let paragraph = &root.children[0];
        let kinds = types(paragraph);
        assert!(kinds.contains(&&MarkdownNodeType::Strong));
        assert!(kinds.contains(&&MarkdownNodeType::Emphasis));
        assert!(kinds.contains(&&MarkdownNodeType::Strikethrough));
        assert!(kinds.contains(&&MarkdownNodeType::Code("e".to_string())));
        assert!(kinds.iter().any(|k| matches!(
            k,
            MarkdownNodeType::Link { url, .. } if url == "https://x.org"
        )));
        assert_eq!(paragraph.text_content(), "a b c d e f");
    }

    #[test]
    fn test_parse_table_alignments() {
        let root = parse_tree("| A | B | C |\n|---|:-:|--:|\n| 1 | 2 | 3 |");
        let table = &root.children[0];
        assert_eq!(
            table.node_type,
            MarkdownNodeType::Table {
                alignments: vec![Alignment::Left, Alignment::Center, Alignment::Right]
            }
        );
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].node_type, MarkdownNodeType::TableRow { header: true });
        assert_eq!(table.children[1].children[2].text_content(), "3");
    }

    #[test]
    fn test_parse_lists_and_tasks() {
        let root = parse_tree("3. three\n4. four\n\n- [x] done\n- [ ] open");
        assert_eq!(
            root.children[0].node_type,
            MarkdownNodeType::List {
                ordered: true,
                start: 3
            }
        );
        assert_eq!(root.children[0].children.len(), 2);
        let tasks = &root.children[1];
        assert_eq!(
            types(tasks),
            vec![
                &MarkdownNodeType::TaskItem { checked: true },
                &MarkdownNodeType::TaskItem { checked: false },
            ]
        );
    }

    #[test]
    fn test_code_block_keeps_literal() {
        let root = parse_tree("```rust\nfn main() {}\n```");
        assert_eq!(
            root.children[0].node_type,
            MarkdownNodeType::CodeBlock {
                info: "rust".to_string(),
                literal: "fn main() {}\n".to_string(),
            }
        );
        assert!(root.children[0].is_block());
    }
}
