//! Markdown formatting commands for the raw editor
//!
//! Inline commands wrap or unwrap the selection with delimiters. Block
//! commands rewrite the prefixes of every line the selection touches. All
//! positions in and out are character offsets; the byte arithmetic stays
//! inside this module.
//!
//! ```ignore
//! let result = apply_format("Hello world", (0, 5), FormatCommand::Bold);
//! assert_eq!(result.text, "**Hello** world");
//! ```

use crate::string_utils::{byte_to_char, char_to_byte};

// ─────────────────────────────────────────────────────────────────────────────
// Format Command Enum
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown formatting commands that can be applied to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Bold text (**text**)
    Bold,
    /// Italic text (*text*)
    Italic,
    /// Inline code (`code`)
    InlineCode,
    /// Strikethrough (~~text~~)
    Strikethrough,
    /// Link ([text](url))
    Link,
    /// Heading level 1-6
    Heading(u8),
    BulletList,
    NumberedList,
    Blockquote,
}

impl FormatCommand {
    /// Menu label.
    pub fn label(&self) -> String {
        match self {
            Self::Bold => "Bold".to_string(),
            Self::Italic => "Italic".to_string(),
            Self::InlineCode => "Inline Code".to_string(),
            Self::Strikethrough => "Strikethrough".to_string(),
            Self::Link => "Link".to_string(),
            Self::Heading(level) => format!("Heading {}", (*level).clamp(1, 6)),
            Self::BulletList => "Bullet List".to_string(),
            Self::NumberedList => "Numbered List".to_string(),
            Self::Blockquote => "Blockquote".to_string(),
        }
    }

    /// Keyboard shortcut label shown next to the menu entry.
    pub fn shortcut_label(&self) -> &'static str {
        match self {
            Self::Bold => "Ctrl+B",
            Self::Italic => "Ctrl+I",
            Self::InlineCode => "Ctrl+`",
            Self::Strikethrough => "Ctrl+Shift+X",
            Self::Link => "Ctrl+K",
            Self::Heading(_) => "",
            Self::BulletList => "Ctrl+Shift+B",
            Self::NumberedList => "Ctrl+Shift+N",
            Self::Blockquote => "Ctrl+Shift+Q",
        }
    }

    /// Every command, in menu order.
    pub fn all() -> Vec<FormatCommand> {
        let mut commands = vec![
            Self::Bold,
            Self::Italic,
            Self::InlineCode,
            Self::Strikethrough,
            Self::Link,
        ];
        commands.extend((1..=6).map(Self::Heading));
        commands.extend([Self::BulletList, Self::NumberedList, Self::Blockquote]);
        commands
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Format Result
// ─────────────────────────────────────────────────────────────────────────────

/// Result of applying a formatting command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    /// The new text after formatting
    pub text: String,
    /// New cursor position (character index)
    pub cursor: usize,
    /// Range to select afterwards (character indices)
    pub selection: Option<(usize, usize)>,
    /// `false` when the command removed existing formatting
    pub applied: bool,
}

impl FormatResult {
    fn at(text: String, cursor_byte: usize) -> Self {
        let cursor = byte_to_char(&text, cursor_byte);
        Self {
            text,
            cursor,
            selection: None,
            applied: true,
        }
    }

    fn selecting(text: String, from_byte: usize, to_byte: usize) -> Self {
        let from = byte_to_char(&text, from_byte);
        let to = byte_to_char(&text, to_byte);
        Self {
            text,
            cursor: to,
            selection: Some((from, to)),
            applied: true,
        }
    }

    fn removed(mut self) -> Self {
        self.applied = false;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Apply `command` to `text` with the selection `(start, end)` in characters.
///
/// An empty selection (`start == end`) is a plain cursor.
pub fn apply_format(text: &str, selection: (usize, usize), command: FormatCommand) -> FormatResult {
    let (a, b) = (char_to_byte(text, selection.0), char_to_byte(text, selection.1));
    let (start, end) = if a <= b { (a, b) } else { (b, a) };

    match command {
        FormatCommand::Bold => wrap_inline(text, start, end, "**"),
        FormatCommand::Italic => wrap_inline(text, start, end, "*"),
        FormatCommand::InlineCode => wrap_inline(text, start, end, "`"),
        FormatCommand::Strikethrough => wrap_inline(text, start, end, "~~"),
        FormatCommand::Link => insert_link(text, start, end),
        FormatCommand::Heading(level) => set_heading(text, start, level.clamp(1, 6)),
        FormatCommand::BulletList => toggle_line_prefix(text, start, end, LinePrefix::Bullet),
        FormatCommand::NumberedList => toggle_line_prefix(text, start, end, LinePrefix::Numbered),
        FormatCommand::Blockquote => toggle_line_prefix(text, start, end, LinePrefix::Quote),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Formatting
// ─────────────────────────────────────────────────────────────────────────────

fn wrap_inline(text: &str, start: usize, end: usize, marker: &str) -> FormatResult {
    let selected = &text[start..end];
    let m = marker.len();

    // Selection includes the markers
    if selected.len() >= 2 * m && selected.starts_with(marker) && selected.ends_with(marker) {
        let inner = &selected[m..selected.len() - m];
        let new_text = format!("{}{}{}", &text[..start], inner, &text[end..]);
        return FormatResult::selecting(new_text, start, start + inner.len()).removed();
    }

    // Markers sit just outside the selection
    if start >= m && text[..start].ends_with(marker) && text[end..].starts_with(marker) {
        let new_text = format!("{}{}{}", &text[..start - m], selected, &text[end + m..]);
        return FormatResult::selecting(new_text, start - m, end - m).removed();
    }

    let new_text = format!("{}{}{}{}{}", &text[..start], marker, selected, marker, &text[end..]);
    if selected.is_empty() {
        // Cursor between the markers, ready to type
        FormatResult::at(new_text, start + m)
    } else {
        FormatResult::selecting(new_text, start + m, end + m)
    }
}

fn insert_link(text: &str, start: usize, end: usize) -> FormatResult {
    let selected = &text[start..end];
    if selected.is_empty() {
        let new_text = format!("{}[text](url){}", &text[..start], &text[end..]);
        return FormatResult::selecting(new_text, start + 1, start + 5);
    }
    let new_text = format!("{}[{}](url){}", &text[..start], selected, &text[end..]);
    let url_start = start + selected.len() + 3;
    FormatResult::selecting(new_text, url_start, url_start + 3)
}

// ─────────────────────────────────────────────────────────────────────────────
// Line Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Byte range of the full lines touched by `start..end`.
fn line_bounds(text: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[end..]
        .find('\n')
        .map(|i| end + i)
        .unwrap_or(text.len());
    (line_start, line_end)
}

fn heading_level(line: &str) -> usize {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    let followed_by_space = line[hashes..].starts_with(' ') || line.len() == hashes;
    if (1..=6).contains(&hashes) && followed_by_space {
        hashes
    } else {
        0
    }
}

/// Set the cursor line to heading `level`, or remove it if already that level.
fn set_heading(text: &str, cursor: usize, level: u8) -> FormatResult {
    let (line_start, line_end) = line_bounds(text, cursor, cursor);
    let line = text[line_start..line_end].trim_start();
    let existing = heading_level(line);
    let content = line[existing..].trim_start();

    if existing == level as usize {
        let new_text = format!("{}{}{}", &text[..line_start], content, &text[line_end..]);
        return FormatResult::at(new_text, line_start + content.len()).removed();
    }

    let new_line = format!("{} {}", "#".repeat(level as usize), content);
    let new_text = format!("{}{}{}", &text[..line_start], new_line, &text[line_end..]);
    FormatResult::at(new_text, line_start + new_line.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinePrefix {
    Bullet,
    Numbered,
    Quote,
}

/// Length of a numbered-list marker like `12. ` or `3) `, if present.
fn numbered_marker_len(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    let rest = &line[digits..];
    (digits > 0 && (rest.starts_with(". ") || rest.starts_with(") "))).then_some(digits + 2)
}

fn bullet_marker_len(line: &str) -> Option<usize> {
    ["- ", "* ", "+ "]
        .iter()
        .find(|marker| line.starts_with(*marker))
        .map(|marker| marker.len())
}

impl LinePrefix {
    fn marker_len(&self, line: &str) -> Option<usize> {
        match self {
            LinePrefix::Bullet => bullet_marker_len(line),
            LinePrefix::Numbered => numbered_marker_len(line),
            LinePrefix::Quote => line.starts_with("> ").then_some(2),
        }
    }

    fn marker(&self, index: usize) -> String {
        match self {
            LinePrefix::Bullet => "- ".to_string(),
            LinePrefix::Numbered => format!("{}. ", index + 1),
            LinePrefix::Quote => "> ".to_string(),
        }
    }
}

/// Add `prefix` to every selected line, or strip it if all lines have it.
///
/// Switching between list kinds replaces the old list marker.
fn toggle_line_prefix(text: &str, start: usize, end: usize, prefix: LinePrefix) -> FormatResult {
    let (line_start, line_end) = line_bounds(text, start, end);
    let lines: Vec<&str> = text[line_start..line_end].split('\n').collect();
    let all_prefixed = lines
        .iter()
        .all(|line| prefix.marker_len(line.trim_start()).is_some());

    let rewritten: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let trimmed = line.trim_start();
            if all_prefixed {
                let len = prefix.marker_len(trimmed).unwrap_or(0);
                return trimmed[len..].to_string();
            }
            let content = match prefix {
                LinePrefix::Quote => *line,
                LinePrefix::Bullet | LinePrefix::Numbered => {
                    let existing = bullet_marker_len(trimmed)
                        .or_else(|| numbered_marker_len(trimmed))
                        .unwrap_or(0);
                    &trimmed[existing..]
                }
            };
            format!("{}{}", prefix.marker(index), content)
        })
        .collect();

    let block = rewritten.join("\n");
    let new_text = format!("{}{}{}", &text[..line_start], block, &text[line_end..]);
    let result = FormatResult::at(new_text, line_start + block.len());
    if all_prefixed {
        result.removed()
    } else {
        result
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
