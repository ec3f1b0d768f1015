//! Locating a pipe table around the cursor

use super::lines::LineAccess;

/// Inclusive, 0-based line range of a table in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBlock {
    pub start_line: usize,
    pub end_line: usize,
}

impl TableBlock {
    /// Number of lines in the block.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Whether `line` falls inside the block.
    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Whether a line belongs to a table.
///
/// Any non-blank line containing a `|` qualifies. This is intentionally
/// loose and also matches prose with a literal pipe (`cat a | grep b`).
pub fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.contains('|')
}

fn is_row_at<B: LineAccess + ?Sized>(buffer: &B, index: usize) -> bool {
    buffer
        .line_at(index)
        .map(|span| is_table_row(span.text))
        .unwrap_or(false)
}

/// Find the table block containing `cursor` (a character offset).
///
/// Returns `None` when the cursor line is not a table row, or when the
/// contiguous run of rows is shorter than a header plus separator.
pub fn locate_table<B: LineAccess + ?Sized>(buffer: &B, cursor: usize) -> Option<TableBlock> {
    let line = buffer.line_of_offset(cursor.min(buffer.char_len()));
    if !is_row_at(buffer, line) {
        return None;
    }

    let mut start_line = line;
    while start_line > 0 && is_row_at(buffer, start_line - 1) {
        start_line -= 1;
    }
    let mut end_line = line;
    while end_line + 1 < buffer.line_count() && is_row_at(buffer, end_line + 1) {
        end_line += 1;
    }

    let block = TableBlock {
        start_line,
        end_line,
    };
    (block.line_count() >= 2).then_some(block)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
