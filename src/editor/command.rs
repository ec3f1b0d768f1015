//! Editor commands
//!
//! Everything the menus and shortcuts can ask of a document, as one enum.

use crate::markdown::FormatCommand;
use crate::table::{Alignment, Placement, TableOperation};

/// A single user-invoked edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Inline or line-level markdown formatting
    Format(FormatCommand),
    /// Structural table edit
    Table(TableOperation),
}

impl EditorCommand {
    /// Menu label.
    pub fn label(&self) -> String {
        match self {
            EditorCommand::Format(cmd) => cmd.label(),
            EditorCommand::Table(op) => op.label().to_string(),
        }
    }

    /// Shortcut text shown next to the menu entry; empty when there is none.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            EditorCommand::Format(cmd) => cmd.shortcut_label(),
            EditorCommand::Table(_) => "",
        }
    }

    /// Table operations offered in the Table menu, in menu order.
    ///
    /// `CreateTable` is left out since its size comes from preferences.
    pub fn table_menu() -> Vec<EditorCommand> {
        [
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
        ]
        .into_iter()
        .map(EditorCommand::Table)
        .collect()
    }

    /// Formatting commands offered in the Format menu.
    pub fn format_menu() -> Vec<EditorCommand> {
        FormatCommand::all()
            .into_iter()
            .map(EditorCommand::Format)
            .collect()
    }
}

impl From<FormatCommand> for EditorCommand {
    fn from(cmd: FormatCommand) -> Self {
        EditorCommand::Format(cmd)
    }
}

impl From<TableOperation> for EditorCommand {
    fn from(op: TableOperation) -> Self {
        EditorCommand::Table(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_menu_excludes_create() {
        let menu = EditorCommand::table_menu();
        assert_eq!(menu.len(), 10);
        assert!(!menu
            .iter()
            .any(|c| matches!(c, EditorCommand::Table(TableOperation::CreateTable { .. }))));
    }

    #[test]
    fn test_labels_delegate() {
        assert_eq!(
            EditorCommand::from(TableOperation::SetAlignment(Alignment::Center)).label(),
            "Align Center"
        );
        assert_eq!(EditorCommand::format_menu().len(), FormatCommand::all().len());
    }
}
