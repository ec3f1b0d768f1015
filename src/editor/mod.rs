//! Editor module for Quillpad
//!
//! Document session state, the command enum dispatched from menus and
//! shortcuts, and find/replace.

mod command;
mod find_replace;
mod session;

pub use command::EditorCommand;
pub use find_replace::FindState;
pub use session::{Document, DEFAULT_UNDO_LIMIT};
