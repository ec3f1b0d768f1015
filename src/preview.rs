//! Rendered preview pane
//!
//! Draws the owned markdown tree with plain egui widgets. The preview is
//! read only; edits happen in the raw editor and show up on the next frame.

use eframe::egui::{self, Color32, FontId, RichText, Ui, Vec2};
use log::debug;
use quillpad::markdown::{parse_tree, MarkdownNode, MarkdownNodeType};
use quillpad::table::Alignment;

// ─────────────────────────────────────────────────────────────────────────────
// Theme Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Theme-aware colors for the preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewColors {
    pub text: Color32,
    pub heading: Color32,
    pub code_bg: Color32,
    pub code_text: Color32,
    pub quote_border: Color32,
    pub quote_text: Color32,
    pub link: Color32,
    /// Horizontal rules and table borders
    pub rule: Color32,
    pub list_marker: Color32,
}

impl PreviewColors {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        if visuals.dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color32::from_rgb(220, 220, 220),
            heading: Color32::from_rgb(100, 180, 255),
            code_bg: Color32::from_rgb(45, 45, 45),
            code_text: Color32::from_rgb(200, 200, 150),
            quote_border: Color32::from_rgb(80, 80, 80),
            quote_text: Color32::from_rgb(180, 180, 180),
            link: Color32::from_rgb(100, 180, 255),
            rule: Color32::from_rgb(80, 80, 80),
            list_marker: Color32::from_rgb(150, 150, 150),
        }
    }

    pub fn light() -> Self {
        Self {
            text: Color32::from_rgb(30, 30, 30),
            heading: Color32::from_rgb(0, 100, 180),
            code_bg: Color32::from_rgb(245, 245, 245),
            code_text: Color32::from_rgb(80, 80, 80),
            quote_border: Color32::from_rgb(200, 200, 200),
            quote_text: Color32::from_rgb(100, 100, 100),
            link: Color32::from_rgb(0, 100, 180),
            rule: Color32::from_rgb(200, 200, 200),
            list_marker: Color32::from_rgb(100, 100, 100),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed tree of the last previewed text. Reparses only when the text changes.
#[derive(Debug, Default)]
pub struct PreviewCache {
    source: String,
    tree: Option<MarkdownNode>,
}

impl PreviewCache {
    pub fn tree(&mut self, content: &str) -> &MarkdownNode {
        if self.tree.is_some() && self.source != content {
            self.tree = None;
        }
        if self.tree.is_none() {
            self.source.clear();
            self.source.push_str(content);
            debug!("Parsing preview ({} bytes)", content.len());
        }
        let source = &self.source;
        self.tree.get_or_insert_with(|| parse_tree(source))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Draw `root` in a scroll area filling `ui`.
pub fn show(ui: &mut Ui, root: &MarkdownNode, font_size: f32) {
    let colors = PreviewColors::from_visuals(ui.visuals());
    egui::ScrollArea::vertical()
        .id_source("preview_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if root.children.is_empty() {
                ui.label(
                    RichText::new("Nothing to preview")
                        .italics()
                        .color(colors.quote_text),
                );
            }
            for child in &root.children {
                render_block(ui, child, &colors, font_size);
            }
        });
}

/// Heading size relative to body text.
fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 1.8,
        2 => 1.5,
        3 => 1.3,
        4 => 1.15,
        5 => 1.05,
        _ => 1.0,
    }
}

fn list_marker(ordered: bool, number: usize) -> String {
    if ordered {
        format!("{}.", number)
    } else {
        "•".to_string()
    }
}

fn cell_align(alignment: Alignment) -> egui::Align {
    match alignment {
        Alignment::Left => egui::Align::Min,
        Alignment::Center => egui::Align::Center,
        Alignment::Right => egui::Align::Max,
    }
}

fn render_block(ui: &mut Ui, node: &MarkdownNode, colors: &PreviewColors, font_size: f32) {
    match &node.node_type {
        MarkdownNodeType::Heading { level } => {
            ui.add_space(if *level <= 2 { 8.0 } else { 4.0 });
            ui.label(
                RichText::new(node.text_content())
                    .size(font_size * heading_scale(*level))
                    .strong()
                    .color(colors.heading),
            );
        }
        MarkdownNodeType::Paragraph => render_inline_content(ui, node, colors, font_size),
        MarkdownNodeType::BlockQuote => {
            let quoted = PreviewColors {
                text: colors.quote_text,
                ..colors.clone()
            };
            let rect = ui
                .horizontal(|ui| {
                    ui.add_space(12.0);
                    ui.vertical(|ui| {
                        for child in &node.children {
                            render_block(ui, child, &quoted, font_size);
                        }
                    });
                })
                .response
                .rect;
            // Bar spans the quote's final height
            let bar = egui::Rect::from_min_size(rect.min, Vec2::new(4.0, rect.height()));
            ui.painter().rect_filled(bar, 0.0, colors.quote_border);
        }
        MarkdownNodeType::List { ordered, start } => {
            for (index, item) in node.children.iter().enumerate() {
                render_list_item(ui, item, colors, font_size, &list_marker(*ordered, start + index));
            }
            ui.add_space(4.0);
        }
        MarkdownNodeType::Item | MarkdownNodeType::TaskItem { .. } => {
            render_list_item(ui, node, colors, font_size, &list_marker(false, 1));
        }
        MarkdownNodeType::CodeBlock { literal, .. } => {
            render_code_block(ui, literal, colors, font_size);
        }
        MarkdownNodeType::HtmlBlock(html) => render_code_block(ui, html, colors, font_size),
        MarkdownNodeType::ThematicBreak => {
            ui.add_space(4.0);
            let (rect, _) = ui
                .allocate_exact_size(Vec2::new(ui.available_width(), 1.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, colors.rule);
            ui.add_space(4.0);
        }
        MarkdownNodeType::Table { alignments } => {
            render_table(ui, node, alignments, colors, font_size);
        }
        MarkdownNodeType::FootnoteDefinition(name) => {
            ui.horizontal_top(|ui| {
                ui.label(
                    RichText::new(format!("[{}]", name))
                        .size(font_size * 0.85)
                        .color(colors.link),
                );
                ui.vertical(|ui| {
                    for child in &node.children {
                        render_block(ui, child, colors, font_size);
                    }
                });
            });
        }
        _ if node.is_block() => {
            for child in &node.children {
                render_block(ui, child, colors, font_size);
            }
        }
        _ => {
            ui.horizontal_wrapped(|ui| {
                render_inline(ui, node, colors, font_size, TextStyle::default());
            });
        }
    }
}

fn render_list_item(
    ui: &mut Ui,
    item: &MarkdownNode,
    colors: &PreviewColors,
    font_size: f32,
    marker: &str,
) {
    ui.horizontal_top(|ui| {
        ui.add_space(8.0);
        if let MarkdownNodeType::TaskItem { checked } = item.node_type {
            let mut checked = checked;
            ui.add_enabled(false, egui::Checkbox::without_text(&mut checked));
        } else {
            ui.label(
                RichText::new(marker)
                    .size(font_size)
                    .color(colors.list_marker),
            );
        }
        ui.vertical(|ui| {
            for child in &item.children {
                render_block(ui, child, colors, font_size);
            }
        });
    });
}

fn render_code_block(ui: &mut Ui, literal: &str, colors: &PreviewColors, font_size: f32) {
    egui::Frame::none()
        .fill(colors.code_bg)
        .inner_margin(8.0)
        .rounding(4.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(literal.trim_end_matches('\n'))
                    .font(FontId::monospace(font_size * 0.9))
                    .color(colors.code_text),
            );
        });
}

fn render_table(
    ui: &mut Ui,
    node: &MarkdownNode,
    alignments: &[Alignment],
    colors: &PreviewColors,
    font_size: f32,
) {
    egui::Frame::none()
        .stroke(egui::Stroke::new(1.0, colors.rule))
        .inner_margin(6.0)
        .show(ui, |ui| {
            egui::Grid::new(("preview_table", node.start_line))
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for row in &node.children {
                        let header =
                            matches!(row.node_type, MarkdownNodeType::TableRow { header: true });
                        for (column, cell) in row.children.iter().enumerate() {
                            let align = cell_align(alignments.get(column).copied().unwrap_or_default());
                            ui.with_layout(egui::Layout::top_down(align), |ui| {
                                let text = RichText::new(cell.text_content()).size(font_size);
                                ui.label(if header {
                                    text.strong().color(colors.heading)
                                } else {
                                    text.color(colors.text)
                                });
                            });
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Accumulated inline formatting for nested emphasis.
#[derive(Debug, Clone, Copy, Default)]
struct TextStyle {
    bold: bool,
    italic: bool,
    strikethrough: bool,
}

impl TextStyle {
    fn apply(&self, text: RichText, colors: &PreviewColors) -> RichText {
        // Strong text takes the theme's strong color
        let mut styled = if self.bold {
            text.strong()
        } else {
            text.color(colors.text)
        };
        if self.italic {
            styled = styled.italics();
        }
        if self.strikethrough {
            styled = styled.strikethrough();
        }
        styled
    }
}

fn render_inline_content(ui: &mut Ui, node: &MarkdownNode, colors: &PreviewColors, font_size: f32) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for child in &node.children {
            render_inline(ui, child, colors, font_size, TextStyle::default());
        }
    });
}

fn render_inline(
    ui: &mut Ui,
    node: &MarkdownNode,
    colors: &PreviewColors,
    font_size: f32,
    style: TextStyle,
) {
    match &node.node_type {
        MarkdownNodeType::Text(text) => {
            ui.label(style.apply(RichText::new(text).size(font_size), colors));
        }
        MarkdownNodeType::Strong => {
            let inner = TextStyle { bold: true, ..style };
            for child in &node.children {
                render_inline(ui, child, colors, font_size, inner);
            }
        }
        MarkdownNodeType::Emphasis => {
            let inner = TextStyle { italic: true, ..style };
            for child in &node.children {
                render_inline(ui, child, colors, font_size, inner);
            }
        }
        MarkdownNodeType::Strikethrough => {
            let inner = TextStyle {
                strikethrough: true,
                ..style
            };
            for child in &node.children {
                render_inline(ui, child, colors, font_size, inner);
            }
        }
        MarkdownNodeType::Code(code) => {
            ui.label(
                RichText::new(code)
                    .color(colors.code_text)
                    .font(FontId::monospace(font_size * 0.9))
                    .background_color(colors.code_bg),
            );
        }
        MarkdownNodeType::Link { url, title } => {
            let response = ui.hyperlink_to(
                RichText::new(node.text_content())
                    .size(font_size)
                    .color(colors.link),
                url,
            );
            if !title.is_empty() {
                response.on_hover_text(title.as_str());
            }
        }
        MarkdownNodeType::Image { url, .. } => {
            let alt = node.text_content();
            let label = if alt.is_empty() { url.as_str() } else { alt.as_str() };
            ui.label(
                RichText::new(format!("[image: {}]", label))
                    .size(font_size)
                    .italics()
                    .color(colors.quote_text),
            )
            .on_hover_text(url.as_str());
        }
        MarkdownNodeType::FootnoteReference(name) => {
            ui.label(
                RichText::new(format!("[{}]", name))
                    .size(font_size * 0.75)
                    .color(colors.link),
            );
        }
        MarkdownNodeType::HtmlInline(html) => {
            ui.label(
                RichText::new(html)
                    .font(FontId::monospace(font_size * 0.9))
                    .color(colors.quote_text),
            );
        }
        MarkdownNodeType::SoftBreak => {
            ui.label(RichText::new(" ").size(font_size));
        }
        MarkdownNodeType::LineBreak => ui.end_row(),
        _ => {
            for child in &node.children {
                render_inline(ui, child, colors, font_size, style);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
