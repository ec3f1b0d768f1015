//! Markdown table editing engine
//!
//! Locates the pipe table around a cursor, parses it into a [`TableModel`],
//! applies a [`TableOperation`], and writes the re-padded table back with the
//! cursor kept on a predictable cell.
//!
//! # Architecture
//!
//! - `lines.rs` - The [`LineAccess`] capability and its two buffer backends
//! - `locator.rs` - Row classification and table block boundaries
//! - `model.rs` - Row parsing, alignment and padded rendering
//! - `ops.rs` - Structural operations and cursor recovery

mod lines;
mod locator;
mod model;
mod ops;

pub use lines::{LineAccess, LineDocument, LineSpan, TextBuffer};
pub use locator::{is_table_row, locate_table, TableBlock};
pub use model::{
    parse_table, render_table, split_row, Alignment, TableModel, MIN_CELL_WIDTH, NEW_COLUMN_HEADER,
};
pub use ops::{
    apply_operation, apply_operation_in, cell_cursor, create_table, table_context, CellCursor,
    Placement, TableContext, TableEdit, TableOperation,
};
