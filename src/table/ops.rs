//! Structural table operations
//!
//! Every operation runs the same pipeline: locate the block around the
//! cursor, parse it, mutate the model, render it back over the same line
//! range, and place the cursor on the cell the user was working in.
//! Operations whose preconditions fail return `None` and leave the buffer
//! untouched.

use super::lines::{LineAccess, TextBuffer};
use super::locator::{locate_table, TableBlock};
use super::model::{parse_table, Alignment, TableModel, NEW_COLUMN_HEADER};
use crate::string_utils::char_len;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Operation Descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// Where a new row or column goes relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

/// A structural edit applied to the table under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOperation {
    /// Insert an empty data row above or below the cursor row
    AddRow(Placement),
    /// Remove the data row under the cursor
    DeleteRow,
    /// Insert a column left or right of the cursor column
    AddColumn(Placement),
    /// Remove the column under the cursor
    DeleteColumn,
    /// Change the alignment of the cursor column
    SetAlignment(Alignment),
    /// Insert a generated table at the cursor
    CreateTable { rows: usize, cols: usize },
    /// Re-render the table without structural changes
    Reformat,
}

impl TableOperation {
    /// Menu label for this operation.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddRow(Placement::Before) => "Insert Row Above",
            Self::AddRow(Placement::After) => "Insert Row Below",
            Self::DeleteRow => "Delete Row",
            Self::AddColumn(Placement::Before) => "Insert Column Left",
            Self::AddColumn(Placement::After) => "Insert Column Right",
            Self::DeleteColumn => "Delete Column",
            Self::SetAlignment(alignment) => alignment.label(),
            Self::CreateTable { .. } => "Insert Table",
            Self::Reformat => "Format Table",
        }
    }

    /// Whether the operation needs an existing table under the cursor.
    pub fn requires_table(&self) -> bool {
        !matches!(self, Self::CreateTable { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cell Cursor
// ─────────────────────────────────────────────────────────────────────────────

/// Cursor position expressed as a table cell.
///
/// `row` 0 is the header, 1 the separator, and `row - 2` indexes data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellCursor {
    pub row: usize,
    pub column: usize,
}

impl CellCursor {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Index into `TableModel::rows`, if the cursor is on a data row.
    pub fn data_index(&self) -> Option<usize> {
        self.row.checked_sub(2)
    }

    /// Derive the column from the pipes before `column_in_line` on `line`.
    pub fn from_line(line: &str, column_in_line: usize, row: usize, column_count: usize) -> Self {
        let pipes = line.chars().take(column_in_line).filter(|&c| c == '|').count();
        let column = if line.trim_start().starts_with('|') {
            pipes.saturating_sub(1)
        } else {
            pipes
        };
        Self {
            row,
            column: column.min(column_count.saturating_sub(1)),
        }
    }
}

/// Resolve `cursor` inside `block` to a cell.
pub fn cell_cursor<B: LineAccess + ?Sized>(
    buffer: &B,
    block: TableBlock,
    cursor: usize,
    column_count: usize,
) -> CellCursor {
    let line = buffer.line_of_offset(cursor).clamp(block.start_line, block.end_line);
    let row = line - block.start_line;
    match buffer.line_at(line) {
        Some(span) => CellCursor::from_line(
            span.text,
            cursor.saturating_sub(span.from),
            row,
            column_count,
        ),
        None => CellCursor::new(row, 0),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Model Mutations
// ─────────────────────────────────────────────────────────────────────────────

impl TableModel {
    /// Insert an empty row; returns the cell the cursor should move to.
    ///
    /// With the cursor on the header or separator, the row always becomes
    /// the first data row.
    pub fn add_row(&mut self, at: CellCursor, placement: Placement) -> CellCursor {
        let index = match at.data_index() {
            None => 0,
            Some(current) => {
                let current = current.min(self.rows.len());
                match placement {
                    Placement::Before => current,
                    Placement::After => (current + 1).min(self.rows.len()),
                }
            }
        };
        self.rows.insert(index, vec![String::new(); self.column_count()]);
        self.normalize_alignments();
        CellCursor::new(index + 2, at.column)
    }

    /// Remove the data row under the cursor.
    ///
    /// Refused on the header/separator and when it is the last data row.
    pub fn delete_row(&mut self, at: CellCursor) -> Option<CellCursor> {
        let index = at.data_index()?;
        if self.rows.len() < 2 || index >= self.rows.len() {
            return None;
        }
        self.rows.remove(index);
        self.normalize_alignments();
        Some(CellCursor::new(index.min(self.rows.len() - 1) + 2, at.column))
    }

    /// Insert a column next to the cursor column.
    pub fn add_column(&mut self, at: CellCursor, placement: Placement) -> CellCursor {
        let offset = match placement {
            Placement::Before => 0,
            Placement::After => 1,
        };
        let index = (at.column + offset).min(self.column_count());

        self.pad_rows();
        self.normalize_alignments();
        self.header.insert(index, NEW_COLUMN_HEADER.to_string());
        self.alignments.insert(index, Alignment::Left);
        for row in &mut self.rows {
            row.insert(index, String::new());
        }
        CellCursor::new(at.row, index)
    }

    /// Remove the column under the cursor. Refused for single-column tables.
    pub fn delete_column(&mut self, at: CellCursor) -> Option<CellCursor> {
        let columns = self.column_count();
        if columns <= 1 {
            return None;
        }
        let index = at.column.min(columns - 1);

        self.normalize_alignments();
        self.header.remove(index);
        self.alignments.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
        Some(CellCursor::new(at.row, index.min(columns - 2)))
    }

    /// Set the alignment of the cursor column.
    pub fn set_alignment(&mut self, at: CellCursor, alignment: Alignment) -> Option<CellCursor> {
        let columns = self.column_count();
        if columns == 0 {
            return None;
        }
        self.normalize_alignments();
        let index = at.column.min(columns - 1);
        self.alignments[index] = alignment;
        Some(CellCursor::new(at.row, index))
    }

    /// Apply `operation` to the model.
    ///
    /// `CreateTable` does not act on an existing model and is always `None`
    /// here; see [`create_table`].
    pub fn apply(&mut self, at: CellCursor, operation: TableOperation) -> Option<CellCursor> {
        match operation {
            TableOperation::AddRow(placement) => Some(self.add_row(at, placement)),
            TableOperation::DeleteRow => self.delete_row(at),
            TableOperation::AddColumn(placement) => Some(self.add_column(at, placement)),
            TableOperation::DeleteColumn => self.delete_column(at),
            TableOperation::SetAlignment(alignment) => self.set_alignment(at, alignment),
            TableOperation::Reformat => {
                self.normalize_alignments();
                Some(at)
            }
            TableOperation::CreateTable { .. } => None,
        }
    }
}

/// Generate a new table, or `None` for a zero-sized request.
pub fn create_table(rows: usize, cols: usize) -> Option<TableModel> {
    (rows >= 1 && cols >= 1).then(|| TableModel::generate(rows, cols))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursor Mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Character offset, within `rendered`, of the text of `cell`.
///
/// `None` if the rendered table has no such cell.
fn cell_offset(rendered: &str, cell: CellCursor) -> Option<usize> {
    let mut line_start = 0;
    for (row, line) in rendered.split('\n').enumerate() {
        if row == cell.row {
            let pipes: Vec<usize> = line
                .chars()
                .enumerate()
                .filter(|&(_, c)| c == '|')
                .map(|(index, _)| index)
                .collect();
            // The cell must be closed by a following pipe
            if cell.column + 1 >= pipes.len() {
                return None;
            }
            return Some(line_start + pipes[cell.column] + 2);
        }
        line_start += char_len(line) + 1;
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffer Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a table edit on a plain string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEdit {
    /// The full replacement buffer
    pub text: String,
    /// New cursor (character offset)
    pub cursor: usize,
}

/// Apply `operation` at `cursor` in `text`.
///
/// Returns `None` when there is no table at the cursor or the operation is
/// not allowed; the caller keeps its buffer as is.
pub fn apply_operation(text: &str, cursor: usize, operation: TableOperation) -> Option<TableEdit> {
    let mut buffer = TextBuffer::new(text);
    let cursor = apply_operation_in(&mut buffer, cursor, operation)?;
    Some(TableEdit {
        text: buffer.into_string(),
        cursor,
    })
}

/// Apply `operation` at `cursor` to any [`LineAccess`] buffer, in place.
///
/// Returns the new cursor offset, or `None` for a no-op. The rebuilt block
/// uses the line ending of its first line, and a `\r` closing the last line
/// is left in place.
pub fn apply_operation_in<B: LineAccess + ?Sized>(
    buffer: &mut B,
    cursor: usize,
    operation: TableOperation,
) -> Option<usize> {
    let cursor = cursor.min(buffer.char_len());

    if let TableOperation::CreateTable { rows, cols } = operation {
        return insert_new_table(buffer, cursor, rows, cols);
    }

    let Some(block) = locate_table(buffer, cursor) else {
        debug!("{}: no table at offset {}", operation.label(), cursor);
        return None;
    };
    let mut model = parse_table(buffer, block);
    if model.column_count() == 0 {
        debug!(
            "{}: lines {}..={} have no cells",
            operation.label(),
            block.start_line,
            block.end_line
        );
        return None;
    }
    let at = cell_cursor(buffer, block, cursor, model.column_count());

    let Some(target) = model.apply(at, operation) else {
        debug!("{}: refused at {:?}", operation.label(), at);
        return None;
    };

    let first = buffer.line_at(block.start_line)?;
    let (from, line_ending) = (first.from, first.line_ending());
    let to = buffer.line_at(block.end_line)?.content_to();
    let rendered = model.render_lines().join(line_ending);
    buffer.replace_range(from, to, &rendered);

    let new_cursor = match cell_offset(&rendered, target) {
        Some(offset) => from + offset,
        None => from,
    };
    debug!(
        "{}: lines {}..={} rebuilt, cursor {:?} -> {:?}",
        operation.label(),
        block.start_line,
        block.end_line,
        at,
        target
    );
    Some(new_cursor.min(buffer.char_len()))
}

/// Line ending for text inserted on `line`: that line's own, or the first
/// line's when `line` is the unterminated last line.
fn line_ending_near<B: LineAccess + ?Sized>(buffer: &B, line: usize) -> &'static str {
    [line, 0]
        .into_iter()
        .filter_map(|index| buffer.line_at(index))
        .map(|span| span.line_ending())
        .find(|ending| *ending == "\r\n")
        .unwrap_or("\n")
}

/// Insert a generated table at `cursor` on lines of its own.
fn insert_new_table<B: LineAccess + ?Sized>(
    buffer: &mut B,
    cursor: usize,
    rows: usize,
    cols: usize,
) -> Option<usize> {
    let model = create_table(rows, cols)?;
    let line = buffer.line_of_offset(cursor);
    let span = buffer.line_at(line)?;
    let line_ending = line_ending_near(buffer, line);
    // Never split a CRLF pair
    let cursor = cursor.min(span.content_to());
    let lead = if cursor > span.from { line_ending } else { "" };
    let trail = if cursor < span.content_to() { line_ending } else { "" };

    let rendered = model.render_lines().join(line_ending);
    let text = format!("{}{}{}", lead, rendered, trail);
    buffer.replace_range(cursor, cursor, &text);

    let first_cell = cell_offset(&rendered, CellCursor::new(0, 0)).unwrap_or(0);
    debug!("Inserted {}x{} table at offset {}", rows, cols, cursor);
    Some(cursor + lead.len() + first_cell)
}

// ─────────────────────────────────────────────────────────────────────────────
// Table Context
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of the table under the cursor, for status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContext {
    pub block: TableBlock,
    pub cell: CellCursor,
    pub columns: usize,
    pub data_rows: usize,
    pub alignment: Alignment,
}

impl TableContext {
    /// Short human-readable description, e.g. `Table 3×2 · row 1, col 2`.
    pub fn describe(&self) -> String {
        let row = match self.cell.data_index() {
            Some(index) => format!("row {}", index + 1),
            None if self.cell.row == 0 => "header".to_string(),
            None => "separator".to_string(),
        };
        format!(
            "Table {}×{} · {}, col {}",
            self.columns,
            self.data_rows,
            row,
            self.cell.column + 1
        )
    }
}

/// Describe the table at `cursor`, if any.
pub fn table_context<B: LineAccess + ?Sized>(buffer: &B, cursor: usize) -> Option<TableContext> {
    let cursor = cursor.min(buffer.char_len());
    let block = locate_table(buffer, cursor)?;
    let model = parse_table(buffer, block);
    if model.column_count() == 0 {
        return None;
    }
    let cell = cell_cursor(buffer, block, cursor, model.column_count());
    Some(TableContext {
        block,
        cell,
        columns: model.column_count(),
        data_rows: model.rows.len(),
        alignment: model.alignments.get(cell.column).copied().unwrap_or_default(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::lines::LineDocument;

    const BASIC: &str = "| A | B |\n|---|---|\n| 1 | 2 |";
    /// Offset of "1" on the data row of `BASIC`
    const ON_DATA_COL0: usize = 22;
    /// Offset of "2" on the data row of `BASIC`
    const ON_DATA_COL1: usize = 26;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn model_of(text: &str) -> TableModel {
        let lines: Vec<&str> = text.lines().collect();
        TableModel::parse(&lines)
    }

    fn model_at(text: &str, cursor: usize) -> (TableModel, CellCursor) {
        let buffer = TextBuffer::new(text);
        let block = locate_table(&buffer, cursor).unwrap();
        let model = parse_table(&buffer, block);
        let at = cell_cursor(&buffer, block, cursor, model.column_count());
        (model, at)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cell cursor
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_cell_cursor_counts_pipes() {
        let (_, at) = model_at(BASIC, ON_DATA_COL0);
        assert_eq!(at, CellCursor::new(2, 0));
        let (_, at) = model_at(BASIC, ON_DATA_COL1);
        assert_eq!(at, CellCursor::new(2, 1));
        // After the trailing pipe clamps to the last column
        let (_, at) = model_at(BASIC, BASIC.len());
        assert_eq!(at, CellCursor::new(2, 1));
        // Before the leading pipe
        let (_, at) = model_at(BASIC, 0);
        assert_eq!(at, CellCursor::new(0, 0));
    }

    #[test]
    fn test_cell_cursor_without_leading_pipe() {
        assert_eq!(CellCursor::from_line("a | b | c", 5, 2, 3).column, 1);
        assert_eq!(CellCursor::from_line("a | b | c", 0, 2, 3).column, 0);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scenarios
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_locate_and_parse() {
        let buffer = TextBuffer::new(BASIC);
        let block = locate_table(&buffer, ON_DATA_COL0).unwrap();
        assert_eq!((block.start_line, block.end_line), (0, 2));
        let model = parse_table(&buffer, block);
        assert_eq!(model.header, cells(&["A", "B"]));
        assert_eq!(model.alignments, vec![Alignment::Left, Alignment::Left]);
        assert_eq!(model.rows, vec![cells(&["1", "2"])]);
    }

    #[test]
    fn test_scenario_add_row_after() {
        let edit =
            apply_operation(BASIC, ON_DATA_COL0, TableOperation::AddRow(Placement::After)).unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows[1], cells(&["", ""]));
        // Cursor lands in the first cell of the new row (line 3 of 23-char lines)
        assert_eq!(edit.cursor, 3 * 24 + 2);
    }

    #[test]
    fn test_scenario_delete_column() {
        let edit = apply_operation(BASIC, ON_DATA_COL1, TableOperation::DeleteColumn).unwrap();
        assert_eq!(edit.text, "| A        |\n| -------- |\n| 1        |");
        let model = model_of(&edit.text);
        assert_eq!(model.header, cells(&["A"]));
        assert_eq!(model.rows, vec![cells(&["1"])]);
        assert_eq!(model.alignments, vec![Alignment::Left]);
        // Falls back to the surviving column on the same row
        assert_eq!(edit.cursor, 2 * 13 + 2);
    }

    #[test]
    fn test_scenario_set_alignment_center() {
        let edit = apply_operation(
            BASIC,
            ON_DATA_COL0,
            TableOperation::SetAlignment(Alignment::Center),
        )
        .unwrap();
        let separator = edit.text.lines().nth(1).unwrap();
        assert!(separator.starts_with("| :--------: |"));
    }

    #[test]
    fn test_scenario_no_table() {
        let text = "plain text\nmore text";
        for cursor in 0..=text.len() {
            assert_eq!(apply_operation(text, cursor, TableOperation::DeleteRow), None);
            assert_eq!(
                apply_operation(text, cursor, TableOperation::AddRow(Placement::After)),
                None
            );
        }
    }

    #[test]
    fn test_scenario_create_table() {
        let model = create_table(2, 2).unwrap();
        assert_eq!(model.header, cells(&["Header 1", "Header 2"]));
        assert_eq!(
            model.rows,
            vec![cells(&["Cell 1-1", "Cell 1-2"]), cells(&["Cell 2-1", "Cell 2-2"])]
        );
        assert!(model.alignments.iter().all(|&a| a == Alignment::Left));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Row operations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_add_row_before() {
        let edit =
            apply_operation(BASIC, ON_DATA_COL1, TableOperation::AddRow(Placement::Before))
                .unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.rows, vec![cells(&["", ""]), cells(&["1", "2"])]);
        // New row is line 2, second cell
        assert_eq!(edit.cursor, 2 * 24 + 13);
    }

    #[test]
    fn test_add_row_from_header_goes_first() {
        let text = "| A |\n|---|\n| 1 |\n| 2 |";
        for placement in [Placement::Before, Placement::After] {
            let edit = apply_operation(text, 2, TableOperation::AddRow(placement)).unwrap();
            let model = model_of(&edit.text);
            assert_eq!(model.rows, vec![cells(&[""]), cells(&["1"]), cells(&["2"])]);
        }
        // Separator row behaves the same way
        let edit = apply_operation(text, 8, TableOperation::AddRow(Placement::After)).unwrap();
        assert_eq!(model_of(&edit.text).rows[0], cells(&[""]));
    }

    #[test]
    fn test_delete_row() {
        let text = "| A |\n|---|\n| 1 |\n| 2 |\n| 3 |";
        // Cursor on "2"
        let edit = apply_operation(text, 20, TableOperation::DeleteRow).unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.rows, vec![cells(&["1"]), cells(&["3"])]);
        // Cursor moves to the row that took its place ("3")
        assert_eq!(&edit.text[edit.cursor..edit.cursor + 1], "3");
    }

    #[test]
    fn test_delete_last_data_row_moves_up() {
        let text = "| A |\n|---|\n| 1 |\n| 2 |";
        let edit = apply_operation(text, 20, TableOperation::DeleteRow).unwrap();
        assert_eq!(model_of(&edit.text).rows, vec![cells(&["1"])]);
        assert_eq!(&edit.text[edit.cursor..edit.cursor + 1], "1");
    }

    #[test]
    fn test_delete_only_row_is_noop() {
        assert_eq!(
            apply_operation(BASIC, ON_DATA_COL0, TableOperation::DeleteRow),
            None
        );
    }

    #[test]
    fn test_delete_row_on_header_is_noop() {
        let text = "| A |\n|---|\n| 1 |\n| 2 |";
        assert_eq!(apply_operation(text, 2, TableOperation::DeleteRow), None);
        assert_eq!(apply_operation(text, 8, TableOperation::DeleteRow), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Column operations
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_add_column_after() {
        let edit =
            apply_operation(BASIC, ON_DATA_COL0, TableOperation::AddColumn(Placement::After))
                .unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.header, cells(&["A", NEW_COLUMN_HEADER, "B"]));
        assert_eq!(model.rows, vec![cells(&["1", "", "2"])]);
        assert_eq!(model.alignments.len(), 3);
    }

    #[test]
    fn test_add_column_before_first() {
        let edit =
            apply_operation(BASIC, ON_DATA_COL0, TableOperation::AddColumn(Placement::Before))
                .unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.header, cells(&[NEW_COLUMN_HEADER, "A", "B"]));
        // Cursor in the new column on the same data row
        let line = edit.text.lines().nth(2).unwrap();
        let line_start = edit.text.find(line).unwrap();
        assert_eq!(edit.cursor, line_start + 2);
    }

    #[test]
    fn test_add_column_pads_short_rows() {
        let text = "| A | B | C |\n|---|---|---|\n| 1 |";
        let edit = apply_operation(text, 30, TableOperation::AddColumn(Placement::After)).unwrap();
        let model = model_of(&edit.text);
        for row in std::iter::once(&model.header).chain(model.rows.iter()) {
            assert_eq!(row.len(), 4);
        }
        assert_eq!(model.rows[0], cells(&["1", "", "", ""]));
    }

    #[test]
    fn test_delete_column_on_single_column_is_noop() {
        let text = "| A |\n|---|\n| 1 |";
        assert_eq!(apply_operation(text, 14, TableOperation::DeleteColumn), None);
    }

    #[test]
    fn test_delete_column_keeps_alignments_in_step() {
        let text = "| A | B | C |\n|:-:|--:|---|\n| 1 | 2 | 3 |";
        // Cursor on "B" in the header
        let edit = apply_operation(text, 6, TableOperation::DeleteColumn).unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.header, cells(&["A", "C"]));
        assert_eq!(model.alignments, vec![Alignment::Center, Alignment::Left]);
        assert_eq!(model.rows, vec![cells(&["1", "3"])]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Alignment / reformat
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_set_alignment_grows_short_alignments() {
        let mut model = TableModel {
            header: cells(&["A", "B", "C"]),
            alignments: vec![Alignment::Center],
            rows: vec![cells(&["1", "2", "3"])],
        };
        let target = model.set_alignment(CellCursor::new(2, 2), Alignment::Right);
        assert_eq!(target, Some(CellCursor::new(2, 2)));
        assert_eq!(
            model.alignments,
            vec![Alignment::Center, Alignment::Left, Alignment::Right]
        );
    }

    #[test]
    fn test_cells_past_the_header_survive_operations() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 | 3 |";
        let edit = apply_operation(text, 2, TableOperation::SetAlignment(Alignment::Right)).unwrap();
        assert_eq!(
            edit.text,
            "|        A | B        | Header   |\n\
             | --------: | -------- | -------- |\n\
             |        1 | 2        | 3        |"
        );
        let context = table_context(&TextBuffer::new(text), 19).unwrap();
        assert_eq!(context.columns, 3);
    }

    #[test]
    fn test_reformat_normalizes_layout() {
        let text = "|a|b|\n|:-|-:|\n|1|2|";
        let edit = apply_operation(text, 0, TableOperation::Reformat).unwrap();
        assert_eq!(
            edit.text,
            "| a        |        b |\n| -------- | --------: |\n| 1        |        2 |"
        );
        assert_eq!(edit.cursor, 2);
    }

    #[test]
    fn test_rows_without_cells_are_not_a_table() {
        let text = "|\n|";
        let operations = [
            TableOperation::AddRow(Placement::After),
            TableOperation::AddColumn(Placement::After),
            TableOperation::SetAlignment(Alignment::Center),
            TableOperation::Reformat,
        ];
        for cursor in 0..=text.len() {
            for operation in operations {
                assert_eq!(apply_operation(text, cursor, operation), None, "{:?}", operation);
            }
            assert_eq!(table_context(&TextBuffer::new(text), cursor), None);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line endings
    // ─────────────────────────────────────────────────────────────────────────

    /// Every `\n` in `text` is part of a `\r\n` pair.
    fn only_crlf(text: &str) -> bool {
        text.matches('\n').count() == text.matches("\r\n").count()
    }

    #[test]
    fn test_crlf_table_keeps_line_endings() {
        let text = "intro\r\n| A | B |\r\n|---|---|\r\n| 1 | 2 |\r\noutro";
        let edit = apply_operation(text, 30, TableOperation::AddRow(Placement::After)).unwrap();
        assert_eq!(
            edit.text,
            "intro\r\n\
             | A        | B        |\r\n\
             | -------- | -------- |\r\n\
             | 1        | 2        |\r\n\
             |          |          |\r\n\
             outro"
        );
        assert!(only_crlf(&edit.text));
        // New row is line 3 of the block; each rebuilt line is 23 chars plus CRLF
        assert_eq!(edit.cursor, 7 + 3 * 25 + 2);
    }

    #[test]
    fn test_crlf_table_at_end_of_document() {
        let text = "| A |\r\n|---|\r\n| 1 |\r\n";
        let edit = apply_operation(text, 0, TableOperation::Reformat).unwrap();
        assert_eq!(edit.text, "| A        |\r\n| -------- |\r\n| 1        |\r\n");
        assert!(only_crlf(&edit.text));
    }

    #[test]
    fn test_create_table_in_crlf_document() {
        let text = "one\r\ntwo";
        // Cursor after "one", between the text and its CRLF
        let edit =
            apply_operation(text, 3, TableOperation::CreateTable { rows: 1, cols: 1 }).unwrap();
        assert_eq!(
            edit.text,
            "one\r\n| Header 1 |\r\n| -------- |\r\n| Cell 1-1 |\r\ntwo"
        );
        // Sitting on the `\n` of the pair behaves the same
        let same =
            apply_operation(text, 4, TableOperation::CreateTable { rows: 1, cols: 1 }).unwrap();
        assert_eq!(same.text, edit.text);
        assert_eq!(&edit.text[edit.cursor..edit.cursor + 8], "Header 1");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Create table
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_create_table_rejects_zero_size() {
        assert!(create_table(0, 2).is_none());
        assert!(create_table(2, 0).is_none());
        assert_eq!(
            apply_operation("text", 0, TableOperation::CreateTable { rows: 0, cols: 3 }),
            None
        );
    }

    #[test]
    fn test_create_table_in_empty_buffer() {
        let edit = apply_operation("", 0, TableOperation::CreateTable { rows: 1, cols: 2 }).unwrap();
        assert_eq!(
            edit.text,
            "| Header 1 | Header 2 |\n| -------- | -------- |\n| Cell 1-1 | Cell 1-2 |"
        );
        assert_eq!(edit.cursor, 2);
    }

    #[test]
    fn test_create_table_mid_line_gets_own_lines() {
        let edit =
            apply_operation("before after", 7, TableOperation::CreateTable { rows: 1, cols: 1 })
                .unwrap();
        assert_eq!(
            edit.text,
            "before \n| Header 1 |\n| -------- |\n| Cell 1-1 |\nafter"
        );
        assert_eq!(&edit.text[edit.cursor..edit.cursor + 8], "Header 1");
    }

    #[test]
    fn test_create_table_ignores_existing_table() {
        let edit =
            apply_operation(BASIC, 0, TableOperation::CreateTable { rows: 1, cols: 1 }).unwrap();
        assert!(edit.text.ends_with(BASIC));
        assert!(edit.text.starts_with("| Header 1 |"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invariants
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_alignment_length_invariant_across_operations() {
        let text = "| A | B |\n|:-:|\n| 1 | 2 |\n| 3 |";
        let operations = [
            TableOperation::AddRow(Placement::Before),
            TableOperation::AddRow(Placement::After),
            TableOperation::DeleteRow,
            TableOperation::AddColumn(Placement::Before),
            TableOperation::AddColumn(Placement::After),
            TableOperation::DeleteColumn,
            TableOperation::SetAlignment(Alignment::Right),
            TableOperation::Reformat,
        ];
        for operation in operations {
            let (mut model, at) = model_at(text, 24);
            if model.apply(at, operation).is_some() {
                assert_eq!(
                    model.alignments.len(),
                    model.header.len(),
                    "{:?}",
                    operation
                );
            }
        }
    }

    #[test]
    fn test_row_count_invariants() {
        let (mut model, at) = model_at(BASIC, ON_DATA_COL0);
        let before = model.rows.len();
        model.add_row(at, Placement::After);
        assert_eq!(model.rows.len(), before + 1);
        assert!(model.delete_row(at).is_some());
        assert_eq!(model.rows.len(), before);
        assert!(model.delete_row(at).is_none());
        assert_eq!(model.rows.len(), before);
    }

    #[test]
    fn test_cursor_always_within_buffer() {
        let text = "x\n| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |";
        let operations = [
            TableOperation::AddRow(Placement::After),
            TableOperation::DeleteRow,
            TableOperation::AddColumn(Placement::After),
            TableOperation::DeleteColumn,
            TableOperation::SetAlignment(Alignment::Center),
            TableOperation::Reformat,
            TableOperation::CreateTable { rows: 2, cols: 3 },
        ];
        for cursor in 0..=text.len() + 3 {
            for operation in operations {
                if let Some(edit) = apply_operation(text, cursor, operation) {
                    assert!(edit.cursor <= edit.text.chars().count());
                }
            }
        }
    }

    #[test]
    fn test_operations_are_deterministic() {
        let first = apply_operation(BASIC, ON_DATA_COL1, TableOperation::AddColumn(Placement::After));
        let second = apply_operation(BASIC, ON_DATA_COL1, TableOperation::AddColumn(Placement::After));
        assert_eq!(first, second);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backends and surroundings
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_surrounding_text_is_preserved() {
        let text = "# Title\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\nTrailing paragraph.";
        let edit = apply_operation(text, 12, TableOperation::AddRow(Placement::After)).unwrap();
        assert!(edit.text.starts_with("# Title\n\n| A "));
        assert!(edit.text.ends_with("|\n\nTrailing paragraph."));
        // Cursor was on the header, so the new row is the first data row
        assert_eq!(model_of(&edit.text[9..edit.text.len() - 21]).rows[0], cells(&["", ""]));
    }

    #[test]
    fn test_line_document_matches_plain_buffer() {
        // Cursor on "1", the first of two data rows
        let fixtures = [
            ("intro\n| A | B |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |\noutro", 28),
            ("intro\r\n| A | B |\r\n|---|---|\r\n| 1 | 2 |\r\n| 3 | 4 |\r\noutro", 31),
        ];
        let operations = [
            TableOperation::AddRow(Placement::Before),
            TableOperation::AddRow(Placement::After),
            TableOperation::DeleteRow,
            TableOperation::AddColumn(Placement::Before),
            TableOperation::AddColumn(Placement::After),
            TableOperation::DeleteColumn,
            TableOperation::SetAlignment(Alignment::Left),
            TableOperation::SetAlignment(Alignment::Center),
            TableOperation::SetAlignment(Alignment::Right),
            TableOperation::Reformat,
            TableOperation::CreateTable { rows: 1, cols: 1 },
        ];
        for (text, cursor) in fixtures {
            for operation in operations {
                let plain = apply_operation(text, cursor, operation).unwrap();
                let mut doc = LineDocument::from_text(text);
                let new_cursor = apply_operation_in(&mut doc, cursor, operation).unwrap();
                assert_eq!(doc.to_text(), plain.text, "{:?}", operation);
                assert_eq!(new_cursor, plain.cursor, "{:?}", operation);
            }
        }
    }

    #[test]
    fn test_multibyte_cells_use_char_offsets() {
        let text = "| Navn | By |\n|---|---|\n| Åse | Tromsø |";
        // Char offset of "Tromsø"'s "T": line 2 starts at char 24, "| Åse | " is 8 chars
        let edit =
            apply_operation(text, 32, TableOperation::AddColumn(Placement::Before)).unwrap();
        let model = model_of(&edit.text);
        assert_eq!(model.header, cells(&["Navn", NEW_COLUMN_HEADER, "By"]));
        assert_eq!(model.rows, vec![cells(&["Åse", "", "Tromsø"])]);
        assert!(edit.cursor <= edit.text.chars().count());
    }

    #[test]
    fn test_table_context() {
        let buffer = TextBuffer::new(BASIC);
        let context = table_context(&buffer, ON_DATA_COL1).unwrap();
        assert_eq!(context.columns, 2);
        assert_eq!(context.data_rows, 1);
        assert_eq!(context.cell, CellCursor::new(2, 1));
        assert_eq!(context.describe(), "Table 2×1 · row 1, col 2");
        assert_eq!(table_context(&TextBuffer::new("none"), 0), None);
    }

    #[test]
    fn test_operation_labels() {
        assert_eq!(TableOperation::DeleteRow.label(), "Delete Row");
        assert_eq!(
            TableOperation::SetAlignment(Alignment::Center).label(),
            "Align Center"
        );
        assert!(!TableOperation::CreateTable { rows: 1, cols: 1 }.requires_table());
        assert!(TableOperation::Reformat.requires_table());
    }
}
