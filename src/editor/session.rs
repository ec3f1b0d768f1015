//! Editor session state for a single document
//!
//! [`Document`] owns the text, cursor, selection and undo history of one
//! open file. Every command goes through [`Document::execute`]; after each
//! edit or cursor move the table under the cursor (if any) is published to
//! subscribers, which is how the status bar stays current.

use super::command::EditorCommand;
use super::find_replace::FindState;
use crate::error::{Error, Result};
use crate::events::{ResultsPublisher, SubscriptionId};
use crate::files::FileStore;
use crate::markdown::apply_format;
use crate::string_utils::char_len;
use crate::table::{apply_operation, table_context, TableContext, TextBuffer};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Default bound on the undo history.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// Content plus cursor, as stored in the undo and redo stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    content: String,
    cursor: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// One open markdown document.
#[derive(Debug)]
pub struct Document {
    /// File path (None for unsaved/new documents)
    path: Option<PathBuf>,
    content: String,
    /// Content as of the last open or save
    saved_content: String,
    /// Cursor as a character offset
    cursor: usize,
    /// Selection as (start, end) character offsets
    selection: Option<(usize, usize)>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_undo_size: usize,
    /// Bumped whenever content changes outside the text widget
    content_version: u64,
    table_context: ResultsPublisher<Option<TableContext>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty, untitled document.
    pub fn new() -> Self {
        Self::with_content(None, String::new())
    }

    /// Create a document with initial content, counted as saved.
    pub fn with_content(path: Option<PathBuf>, content: String) -> Self {
        Self {
            path,
            saved_content: content.clone(),
            content,
            cursor: 0,
            selection: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_size: DEFAULT_UNDO_LIMIT,
            content_version: 0,
            table_context: ResultsPublisher::new(),
        }
    }

    /// Create an untitled document from a template body.
    ///
    /// Unlike [`Document::with_content`], the text counts as unsaved.
    pub fn from_template(content: String) -> Self {
        let mut doc = Self::new();
        doc.content = content;
        doc
    }

    /// Read `path` through `store`.
    pub fn open(store: &dyn FileStore, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = store.read(path)?;
        info!("Opened document: {}", path.display());
        Ok(Self::with_content(Some(path.to_path_buf()), content))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write to the document's own path.
    ///
    /// Fails with [`Error::Application`] for a document that was never saved.
    pub fn save(&mut self, store: &dyn FileStore) -> Result<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::Application("Document has no file path".to_string()))?;
        self.save_as(store, path)
    }

    /// Write to `path` and adopt it as the document's path.
    pub fn save_as(&mut self, store: &dyn FileStore, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        store.write(&path, &self.content)?;
        info!("Saved document: {}", path.display());
        self.path = Some(path);
        self.mark_saved();
        Ok(())
    }

    /// Mark the current content as saved.
    pub fn mark_saved(&mut self) {
        self.saved_content = self.content.clone();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor as a character offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// Check if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.content != self.saved_content
    }

    /// Display title: file name or "Untitled", with `*` when modified.
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled");

        if self.is_modified() {
            format!("{}*", name)
        } else {
            name.to_string()
        }
    }

    /// Counter that changes whenever content is replaced by a command,
    /// undo, or redo. Text widgets compare it to know when to reload.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Limit the undo history, dropping the oldest entries if needed.
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.max_undo_size = limit.max(1);
        self.trim_undo();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Table Context
    // ─────────────────────────────────────────────────────────────────────────

    /// Subscribe to the table context published after each edit or move.
    pub fn subscribe_table_context(
        &mut self,
        callback: impl Fn(&Option<TableContext>) + 'static,
    ) -> SubscriptionId {
        self.table_context.subscribe(callback)
    }

    pub fn unsubscribe_table_context(&mut self, id: SubscriptionId) -> bool {
        self.table_context.unsubscribe(id)
    }

    /// The table under the cursor, if any.
    pub fn current_table(&self) -> Option<TableContext> {
        table_context(&TextBuffer::new(self.content.as_str()), self.cursor)
    }

    fn publish_context(&self) {
        if self.table_context.subscriber_count() > 0 {
            self.table_context.publish(&self.current_table());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the cursor. Offsets past the end are clamped.
    ///
    /// Publishes the table context when the position actually changes.
    pub fn set_cursor(&mut self, cursor: usize, selection: Option<(usize, usize)>) {
        let len = char_len(&self.content);
        let cursor = cursor.min(len);
        let selection = selection
            .map(|(a, b)| (a.min(len), b.min(len)))
            .filter(|(a, b)| a != b);
        if cursor == self.cursor && selection == self.selection {
            return;
        }
        self.cursor = cursor;
        self.selection = selection;
        self.publish_context();
    }

    /// Replace the content with text typed in the editor widget.
    ///
    /// Records an undo entry; `content_version` is left alone since the
    /// widget already shows this text.
    pub fn set_content(&mut self, content: String, cursor: usize) {
        if content == self.content {
            self.set_cursor(cursor, self.selection);
            return;
        }
        self.push_undo();
        self.redo_stack.clear();
        self.content = content;
        self.cursor = cursor.min(char_len(&self.content));
        self.selection = None;
        self.publish_context();
    }

    /// Run `command` at the current cursor or selection.
    ///
    /// Returns `false` when the command was a no-op (for example a table
    /// operation with no table under the cursor); nothing changes then.
    pub fn execute(&mut self, command: EditorCommand) -> bool {
        let (content, cursor, selection) = match command {
            EditorCommand::Format(format) => {
                let range = self.selection.unwrap_or((self.cursor, self.cursor));
                let result = apply_format(&self.content, range, format);
                (result.text, result.cursor, result.selection)
            }
            EditorCommand::Table(operation) => {
                match apply_operation(&self.content, self.cursor, operation) {
                    Some(edit) => (edit.text, edit.cursor, None),
                    None => {
                        debug!("{} ignored at offset {}", operation.label(), self.cursor);
                        return false;
                    }
                }
            }
        };
        debug!("Executed {}", command.label());
        self.replace_content(content, cursor, selection);
        true
    }

    /// Undo the last edit. Returns `true` if undo was performed.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(previous);
        true
    }

    /// Redo the last undone edit. Returns `true` if redo was performed.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.snapshot());
        self.trim_undo();
        self.restore(next);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find / Replace
    // ─────────────────────────────────────────────────────────────────────────

    /// Search the document and select the first match at or after the cursor.
    pub fn find(&mut self, find: &mut FindState) -> usize {
        let count = find.find_matches(&self.content);
        if let Some((start, end)) = find.select_from(self.cursor) {
            self.set_cursor(end, Some((start, end)));
        }
        count
    }

    /// Select the match `find` currently points at.
    pub fn select_match(&mut self, find: &FindState) {
        if let Some((start, end)) = find.current_match_position() {
            self.set_cursor(end, Some((start, end)));
        }
    }

    /// Replace the current match. Returns `false` if there was none.
    pub fn replace_current(&mut self, find: &mut FindState) -> bool {
        match find.replace_current(&self.content) {
            Some((content, cursor)) => {
                self.replace_content(content, cursor, None);
                true
            }
            None => false,
        }
    }

    /// Replace every match as a single undoable edit.
    pub fn replace_all(&mut self, find: &mut FindState) -> usize {
        let (content, count) = find.replace_all(&self.content);
        if count > 0 {
            info!("Replaced {} occurrence(s)", count);
            let cursor = self.cursor;
            self.replace_content(content, cursor, None);
        }
        count
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            content: self.content.clone(),
            cursor: self.cursor,
        }
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.trim_undo();
    }

    fn trim_undo(&mut self) {
        if self.undo_stack.len() > self.max_undo_size {
            let excess = self.undo_stack.len() - self.max_undo_size;
            self.undo_stack.drain(..excess);
        }
    }

    /// Swap in command output, recording undo only when the text changed.
    fn replace_content(&mut self, content: String, cursor: usize, selection: Option<(usize, usize)>) {
        if content != self.content {
            self.push_undo();
            self.redo_stack.clear();
            self.content = content;
            self.content_version = self.content_version.wrapping_add(1);
        }
        let len = char_len(&self.content);
        self.cursor = cursor.min(len);
        self.selection = selection.map(|(a, b)| (a.min(len), b.min(len)));
        self.publish_context();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.content = snapshot.content;
        self.cursor = snapshot.cursor.min(char_len(&self.content));
        self.selection = None;
        self.content_version = self.content_version.wrapping_add(1);
        self.publish_context();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
