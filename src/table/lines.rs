//! Line access over editable buffers
//!
//! The table engine never touches a concrete buffer type. It reads lines and
//! writes replacements through [`LineAccess`], which is implemented both by a
//! plain string buffer ([`TextBuffer`]) and by a document stored as a vector
//! of lines ([`LineDocument`]).
//!
//! All offsets are character offsets into the whole buffer, with lines joined
//! by a single `\n`. In a CRLF document the `\r` stays at the end of each
//! line's text; [`LineSpan::line_ending`] and [`LineSpan::content_to`] let
//! callers write lines back with the same terminator.

use crate::string_utils::{char_len, char_to_byte};

// ─────────────────────────────────────────────────────────────────────────────
// Line Accessor
// ─────────────────────────────────────────────────────────────────────────────

/// One line of a buffer, without its terminating newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan<'a> {
    /// Character offset of the first character of the line
    pub from: usize,
    /// Character offset just past the last character (the newline position)
    pub to: usize,
    /// Line content
    pub text: &'a str,
}

impl LineSpan<'_> {
    /// Offset just past the visible text, before any trailing `\r`.
    pub fn content_to(&self) -> usize {
        if self.text.ends_with('\r') {
            self.to - 1
        } else {
            self.to
        }
    }

    /// The terminator this line was written with.
    pub fn line_ending(&self) -> &'static str {
        if self.text.ends_with('\r') {
            "\r\n"
        } else {
            "\n"
        }
    }
}

/// Read/replace capability the table engine is written against.
///
/// A buffer always has at least one (possibly empty) line.
pub trait LineAccess {
    /// Number of lines in the buffer.
    fn line_count(&self) -> usize;

    /// The line at `index`, or `None` when out of range.
    fn line_at(&self, index: usize) -> Option<LineSpan<'_>>;

    /// Replace the characters in `from..to` with `text`.
    ///
    /// Offsets are clamped to the buffer and swapped if reversed.
    fn replace_range(&mut self, from: usize, to: usize, text: &str);

    /// Total length of the buffer in characters.
    fn char_len(&self) -> usize {
        self.line_count()
            .checked_sub(1)
            .and_then(|last| self.line_at(last))
            .map(|span| span.to)
            .unwrap_or(0)
    }

    /// Index of the line containing `offset`.
    ///
    /// An offset sitting on a newline belongs to the line that newline ends.
    fn line_of_offset(&self, offset: usize) -> usize {
        let (mut lo, mut hi) = (0, self.line_count().saturating_sub(1));
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            match self.line_at(mid) {
                Some(span) if span.from <= offset => lo = mid,
                _ => hi = mid - 1,
            }
        }
        lo
    }
}

/// Clamp a `from..to` pair to `0..=len` and put it in order.
fn ordered_range(from: usize, to: usize, len: usize) -> (usize, usize) {
    let (from, to) = (from.min(len), to.min(len));
    if from <= to {
        (from, to)
    } else {
        (to, from)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plain String Backend
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineStart {
    byte: usize,
    char: usize,
}

/// A plain `String` buffer with an index of line starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    starts: Vec<LineStart>,
}

impl TextBuffer {
    /// Wrap `text` and index its lines.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let starts = index_lines(&text);
        Self { text, starts }
    }

    /// The current buffer content.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the buffer, returning its content.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(String::new())
    }
}

fn index_lines(text: &str) -> Vec<LineStart> {
    let mut starts = vec![LineStart { byte: 0, char: 0 }];
    for (char_index, (byte, ch)) in text.char_indices().enumerate() {
        if ch == '\n' {
            starts.push(LineStart {
                byte: byte + 1,
                char: char_index + 1,
            });
        }
    }
    starts
}

impl LineAccess for TextBuffer {
    fn line_count(&self) -> usize {
        self.starts.len()
    }

    fn line_at(&self, index: usize) -> Option<LineSpan<'_>> {
        let start = *self.starts.get(index)?;
        let end_byte = self
            .starts
            .get(index + 1)
            .map(|next| next.byte - 1)
            .unwrap_or(self.text.len());
        let text = &self.text[start.byte..end_byte];
        Some(LineSpan {
            from: start.char,
            to: start.char + char_len(text),
            text,
        })
    }

    fn replace_range(&mut self, from: usize, to: usize, text: &str) {
        let (from, to) = ordered_range(from, to, self.char_len());
        let byte_from = char_to_byte(&self.text, from);
        let byte_to = char_to_byte(&self.text, to);
        self.text.replace_range(byte_from..byte_to, text);
        self.starts = index_lines(&self.text);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Vector Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A document held as a vector of lines, as a structured editor view keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDocument {
    lines: Vec<String>,
    /// Character offset of each line start
    starts: Vec<usize>,
}

impl LineDocument {
    /// Split `text` on `\n` into a line document.
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.split('\n').map(String::from).collect())
    }

    /// Build a document from already split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        let mut doc = Self {
            lines,
            starts: Vec::new(),
        };
        doc.reindex();
        doc
    }

    /// The document lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the lines back into a single string.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    fn reindex(&mut self) {
        self.starts.clear();
        let mut offset = 0;
        for line in &self.lines {
            self.starts.push(offset);
            offset += char_len(line) + 1;
        }
    }
}

impl LineAccess for LineDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_at(&self, index: usize) -> Option<LineSpan<'_>> {
        let text = self.lines.get(index)?;
        let from = self.starts[index];
        Some(LineSpan {
            from,
            to: from + char_len(text),
            text,
        })
    }

    fn replace_range(&mut self, from: usize, to: usize, text: &str) {
        let (from, to) = ordered_range(from, to, self.char_len());
        let first = self.line_of_offset(from);
        let last = self.line_of_offset(to);

        let head = &self.lines[first];
        let head = &head[..char_to_byte(head, from - self.starts[first])];
        let tail = &self.lines[last];
        let tail = &tail[char_to_byte(tail, to - self.starts[last])..];

        let merged = format!("{}{}{}", head, text, tail);
        let replacement: Vec<String> = merged.split('\n').map(String::from).collect();
        self.lines.splice(first..=last, replacement);
        self.reindex();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
