//! Table model: parsing pipe rows and rendering padded markdown
//!
//! Parsing is permissive. Malformed separator cells degrade to left
//! alignment, ragged rows are accepted, and nothing here returns an error.
//! A data row wider than the header widens the header instead of losing
//! cells.
//! Rendering pads every cell to at least [`MIN_CELL_WIDTH`] characters so the
//! raw source stays readable.

use super::lines::LineAccess;
use super::locator::TableBlock;
use crate::string_utils::char_len;

/// Minimum rendered width of a cell, in characters.
pub const MIN_CELL_WIDTH: usize = 8;

/// Header text given to inserted columns.
pub const NEW_COLUMN_HEADER: &str = "Header";

// ─────────────────────────────────────────────────────────────────────────────
// Alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Column alignment encoded in the separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Classify one separator cell.
    ///
    /// Cells that are not made of dashes and colons are treated as `Left`.
    pub fn from_separator(cell: &str) -> Self {
        let cell = cell.trim();
        if !cell.contains('-') || !cell.chars().all(|c| c == '-' || c == ':') {
            return Alignment::Left;
        }
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Alignment::Center,
            (false, true) => Alignment::Right,
            _ => Alignment::Left,
        }
    }

    /// The separator token written for this alignment.
    pub fn separator_token(&self) -> &'static str {
        match self {
            Alignment::Left => "--------",
            Alignment::Center => ":--------:",
            Alignment::Right => "--------:",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Alignment::Left => "Align Left",
            Alignment::Center => "Align Center",
            Alignment::Right => "Align Right",
        }
    }

    /// Pad `text` to `width` characters according to this alignment.
    fn pad(&self, text: &str, width: usize) -> String {
        let fill = width.saturating_sub(char_len(text));
        let (left, right) = match self {
            Alignment::Left => (0, fill),
            Alignment::Right => (fill, 0),
            Alignment::Center => (fill / 2, fill - fill / 2),
        };
        format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Split a pipe-delimited line into trimmed cells.
///
/// The empty segments produced by a leading and a trailing `|` are dropped.
/// Escaped pipes are not recognized: every `|` is a cell boundary.
pub fn split_row(line: &str) -> Vec<String> {
    let mut segments: Vec<&str> = line.trim().split('|').collect();
    if segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }
    if segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments.into_iter().map(|s| s.trim().to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Table Model
// ─────────────────────────────────────────────────────────────────────────────

/// Structured form of a markdown pipe table.
///
/// The column count is `header.len()`. `alignments` always has exactly that
/// many entries; data rows may be shorter (missing cells render empty).
/// A model with no columns has no markdown form and renders as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableModel {
    /// Header cells, trimmed
    pub header: Vec<String>,
    /// One alignment per column
    pub alignments: Vec<Alignment>,
    /// Data rows (everything after the separator row)
    pub rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Parse raw table lines: header, separator, then data rows.
    ///
    /// A missing separator yields all-left alignment. When a data row has
    /// more cells than the header, the header is extended with
    /// [`NEW_COLUMN_HEADER`] cells so the extra text is kept.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let lines: Vec<&str> = lines.iter().map(|line| line.as_ref()).collect();
        let mut header = lines.first().map(|line| split_row(line)).unwrap_or_default();
        let rows: Vec<Vec<String>> = lines.iter().skip(2).map(|line| split_row(line)).collect();

        let columns = rows.iter().map(Vec::len).fold(header.len(), usize::max);
        header.resize(columns, NEW_COLUMN_HEADER.to_string());

        let mut alignments: Vec<Alignment> = lines
            .get(1)
            .map(|line| split_row(line))
            .unwrap_or_default()
            .iter()
            .map(|cell| Alignment::from_separator(cell))
            .collect();
        alignments.resize(columns, Alignment::Left);

        Self {
            header,
            alignments,
            rows,
        }
    }

    /// Generate a fresh table with `Header N` and `Cell r-c` labels.
    pub fn generate(rows: usize, cols: usize) -> Self {
        Self {
            header: (1..=cols).map(|c| format!("Header {}", c)).collect(),
            alignments: vec![Alignment::Left; cols],
            rows: (1..=rows)
                .map(|r| (1..=cols).map(|c| format!("Cell {}-{}", r, c)).collect())
                .collect(),
        }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rendered lines (header + separator + data rows).
    pub fn line_count(&self) -> usize {
        self.rows.len() + 2
    }

    /// Grow `alignments` with `Left` (or shrink it) to the column count.
    pub(crate) fn normalize_alignments(&mut self) {
        self.alignments.resize(self.column_count(), Alignment::Left);
    }

    /// Pad every data row with empty cells up to the column count.
    pub(crate) fn pad_rows(&mut self) {
        let columns = self.column_count();
        for row in &mut self.rows {
            if row.len() < columns {
                row.resize(columns, String::new());
            }
        }
    }

    fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    fn render_cells(&self, cells: &[String]) -> String {
        let rendered: Vec<String> = (0..self.column_count())
            .map(|column| {
                let text = cells.get(column).map(String::as_str).unwrap_or("");
                let width = char_len(text).max(MIN_CELL_WIDTH);
                self.alignment(column).pad(text, width)
            })
            .collect();
        join_row(&rendered)
    }

    fn render_separator(&self) -> String {
        let tokens: Vec<&str> = (0..self.column_count())
            .map(|column| self.alignment(column).separator_token())
            .collect();
        join_row(&tokens)
    }

    /// Render each table line, without terminators.
    ///
    /// Empty when the model has no columns.
    pub fn render_lines(&self) -> Vec<String> {
        if self.column_count() == 0 {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(self.line_count());
        lines.push(self.render_cells(&self.header));
        lines.push(self.render_separator());
        for row in &self.rows {
            lines.push(self.render_cells(row));
        }
        lines
    }

    /// Render the table as markdown lines joined by `\n`, no trailing newline.
    pub fn render(&self) -> String {
        self.render_lines().join("\n")
    }
}

fn join_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(|cell| cell.as_ref()).collect();
    format!("| {} |", cells.join(" | "))
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffer-Level Entry Points
// ─────────────────────────────────────────────────────────────────────────────

/// Parse the lines of `block` out of `buffer`.
pub fn parse_table<B: LineAccess + ?Sized>(buffer: &B, block: TableBlock) -> TableModel {
    let lines: Vec<&str> = (block.start_line..=block.end_line)
        .filter_map(|i| buffer.line_at(i))
        .map(|span| span.text)
        .collect();
    TableModel::parse(&lines)
}

/// Render `model` as a block of markdown lines.
pub fn render_table(model: &TableModel) -> String {
    model.render()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::lines::TextBuffer;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row splitting
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_split_row_with_outer_pipes() {
        assert_eq!(split_row("| A | B |"), cells(&["A", "B"]));
    }

    #[test]
    fn test_split_row_without_outer_pipes() {
        assert_eq!(split_row("A | B"), cells(&["A", "B"]));
        assert_eq!(split_row("  | A | B"), cells(&["A", "B"]));
    }

    #[test]
    fn test_split_row_keeps_inner_empty_cells() {
        assert_eq!(split_row("| a |  | c |"), cells(&["a", "", "c"]));
        assert_eq!(split_row("|"), Vec::<String>::new());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Alignment
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_alignment_from_separator() {
        assert_eq!(Alignment::from_separator("---"), Alignment::Left);
        assert_eq!(Alignment::from_separator(":---"), Alignment::Left);
        assert_eq!(Alignment::from_separator("---:"), Alignment::Right);
        assert_eq!(Alignment::from_separator(" :-: "), Alignment::Center);
    }

    #[test]
    fn test_malformed_separator_degrades_to_left() {
        assert_eq!(Alignment::from_separator("abc:"), Alignment::Left);
        assert_eq!(Alignment::from_separator(":x:"), Alignment::Left);
        assert_eq!(Alignment::from_separator("::"), Alignment::Left);
        assert_eq!(Alignment::from_separator(""), Alignment::Left);
    }

    #[test]
    fn test_pad_center_extra_space_right() {
        assert_eq!(Alignment::Center.pad("abc", 8), "  abc   ");
        assert_eq!(Alignment::Right.pad("abc", 8), "     abc");
        assert_eq!(Alignment::Left.pad("abc", 8), "abc     ");
        assert_eq!(Alignment::Left.pad("overlong text", 8), "overlong text");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parsing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_simple_table() {
        let model = TableModel::parse(&["| A | B |", "|---|---|", "| 1 | 2 |"]);
        assert_eq!(model.header, cells(&["A", "B"]));
        assert_eq!(model.alignments, vec![Alignment::Left, Alignment::Left]);
        assert_eq!(model.rows, vec![cells(&["1", "2"])]);
    }

    #[test]
    fn test_parse_pads_short_separator() {
        let model = TableModel::parse(&["| A | B | C |", "| :-: |", "| x |"]);
        assert_eq!(
            model.alignments,
            vec![Alignment::Center, Alignment::Left, Alignment::Left]
        );
        assert_eq!(model.rows[0], cells(&["x"]));
    }

    #[test]
    fn test_parse_widens_header_for_long_rows() {
        let model = TableModel::parse(&["| A | B |", "|:-:|---|", "| 1 | 2 | 3 | 4 |", "| x |"]);
        assert_eq!(model.header, cells(&["A", "B", NEW_COLUMN_HEADER, NEW_COLUMN_HEADER]));
        assert_eq!(
            model.alignments,
            vec![Alignment::Center, Alignment::Left, Alignment::Left, Alignment::Left]
        );
        assert_eq!(model.rows[0], cells(&["1", "2", "3", "4"]));
        assert_eq!(model.rows[1], cells(&["x"]));
    }

    #[test]
    fn test_parse_header_without_cells() {
        let model = TableModel::parse(&["|", "|"]);
        assert_eq!(model.column_count(), 0);
        // Cells in data rows still become columns
        let model = TableModel::parse(&["|", "|---|", "| kept |"]);
        assert_eq!(model.header, cells(&[NEW_COLUMN_HEADER]));
        assert_eq!(model.rows, vec![cells(&["kept"])]);
    }

    #[test]
    fn test_parse_table_from_buffer_block() {
        let buffer = TextBuffer::new("intro\n| A | B |\n|---|--:|\n| 1 | 2 |\noutro");
        let block = TableBlock {
            start_line: 1,
            end_line: 3,
        };
        let model = parse_table(&buffer, block);
        assert_eq!(model.alignments, vec![Alignment::Left, Alignment::Right]);
        assert_eq!(model.rows.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_pads_to_minimum_width() {
        let model = TableModel::parse(&["| A | B |", "|---|:-:|", "| 1 | 2 |"]);
        assert_eq!(
            model.render(),
            "| A        | B        |\n\
             | -------- | :--------: |\n\
             | 1        | 2        |"
        );
    }

    #[test]
    fn test_render_short_rows_as_empty_cells() {
        let model = TableModel {
            header: cells(&["A", "B"]),
            alignments: vec![Alignment::Left; 2],
            rows: vec![cells(&["only"])],
        };
        let rendered = model.render();
        assert_eq!(rendered.lines().nth(2), Some("| only     |          |"));
    }

    #[test]
    fn test_render_right_alignment() {
        let model = TableModel {
            header: cells(&["Price"]),
            alignments: vec![Alignment::Right],
            rows: vec![cells(&["9.99"])],
        };
        assert_eq!(
            model.render(),
            "|    Price |\n| --------: |\n|     9.99 |"
        );
    }

    #[test]
    fn test_render_without_columns_is_empty() {
        let model = TableModel {
            rows: vec![Vec::new()],
            ..TableModel::default()
        };
        assert_eq!(model.render(), "");
        assert!(model.render_lines().is_empty());
    }

    #[test]
    fn test_render_has_no_trailing_newline() {
        let model = TableModel::generate(1, 1);
        assert!(!render_table(&model).ends_with('\n'));
    }

    #[test]
    fn test_render_counts_characters_not_bytes() {
        let model = TableModel {
            header: cells(&["Navn"]),
            alignments: vec![Alignment::Left],
            rows: vec![cells(&["blåbær"])],
        };
        assert_eq!(model.render().lines().nth(2), Some("| blåbær   |"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Round trips
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_render_roundtrip() {
        let model = TableModel {
            header: cells(&["Name", "Qty", "A fairly long header"]),
            alignments: vec![Alignment::Left, Alignment::Right, Alignment::Center],
            rows: vec![
                cells(&["apple", "3", "red"]),
                cells(&["", "12", "a cell wider than eight"]),
            ],
        };
        let rendered = model.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(TableModel::parse(&lines), model);
    }

    #[test]
    fn test_rerender_is_idempotent() {
        let raw = ["|a|b|c|", "|:--|:-:|--:|", "|1|2|", "|x|y|z|extra|"];
        let once = TableModel::parse(&raw).render();
        let lines: Vec<&str> = once.lines().collect();
        let twice = TableModel::parse(&lines).render();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rerender_without_columns_is_idempotent() {
        let once = TableModel::parse(&["|", "|"]).render();
        let lines: Vec<&str> = once.split('\n').collect();
        let twice = TableModel::parse(&lines).render();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_generate_labels() {
        let model = TableModel::generate(2, 2);
        assert_eq!(model.header, cells(&["Header 1", "Header 2"]));
        assert_eq!(
            model.rows,
            vec![cells(&["Cell 1-1", "Cell 1-2"]), cells(&["Cell 2-1", "Cell 2-2"])]
        );
        assert_eq!(model.alignments, vec![Alignment::Left; 2]);
    }
}
