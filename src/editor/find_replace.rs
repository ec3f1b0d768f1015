//! Find and Replace for Quillpad
//!
//! Literal and regex search with case-sensitive and whole-word modes.
//! Literal terms are escaped and run through the same regex engine, so
//! case folding never shifts match offsets. Match positions are character
//! offsets, matching the editor cursor.

use crate::string_utils::{byte_to_char, char_to_byte};
use log::debug;
use regex::{NoExpand, Regex};

// ─────────────────────────────────────────────────────────────────────────────
// Find State
// ─────────────────────────────────────────────────────────────────────────────

/// Search options, results, and the selected match for one document.
#[derive(Debug, Clone, Default)]
pub struct FindState {
    /// Current search term
    pub search_term: String,
    /// Current replacement text
    pub replace_term: String,
    /// Whether search is case-sensitive
    pub case_sensitive: bool,
    /// Whether to match whole words only
    pub whole_word: bool,
    /// Whether to use regex matching
    pub use_regex: bool,
    /// Current match index (0-indexed)
    pub current_match: usize,
    /// All matches as (start, end) character positions
    pub matches: Vec<(usize, usize)>,
    /// Compile error of the last regex search, if any
    pub error: Option<String>,
}

impl FindState {
    /// Create a new FindState.
    pub fn new() -> Self {
        Self::default()
    }

    fn build_regex(&self) -> Result<Regex, regex::Error> {
        let body = if self.use_regex {
            self.search_term.clone()
        } else {
            regex::escape(&self.search_term)
        };
        let body = if self.whole_word {
            format!(r"\b(?:{})\b", body)
        } else {
            body
        };
        let pattern = if self.case_sensitive {
            body
        } else {
            format!("(?i){}", body)
        };
        Regex::new(&pattern)
    }

    /// Find all matches in `text`. Returns the number found.
    ///
    /// Empty matches (possible with regexes like `a*`) are skipped.
    pub fn find_matches(&mut self, text: &str) -> usize {
        self.matches.clear();
        self.error = None;

        if self.search_term.is_empty() {
            return 0;
        }

        match self.build_regex() {
            Ok(re) => {
                self.matches = re
                    .find_iter(text)
                    .filter(|m| !m.as_str().is_empty())
                    .map(|m| (byte_to_char(text, m.start()), byte_to_char(text, m.end())))
                    .collect();
            }
            Err(e) => {
                debug!("Invalid regex pattern '{}': {}", self.search_term, e);
                self.error = Some(e.to_string());
            }
        }

        if self.current_match >= self.matches.len() {
            self.current_match = 0;
        }
        self.matches.len()
    }

    /// Select the first match starting at or after `cursor`, wrapping around.
    pub fn select_from(&mut self, cursor: usize) -> Option<(usize, usize)> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_match = self
            .matches
            .iter()
            .position(|&(start, _)| start >= cursor)
            .unwrap_or(0);
        self.current_match_position()
    }

    /// Move to the next match.
    ///
    /// Returns the new current match index, or None if no matches.
    pub fn next_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_match = (self.current_match + 1) % self.matches.len();
        Some(self.current_match)
    }

    /// Move to the previous match.
    pub fn prev_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_match = self
            .current_match
            .checked_sub(1)
            .unwrap_or(self.matches.len() - 1);
        Some(self.current_match)
    }

    /// The current match as (start, end) character positions.
    pub fn current_match_position(&self) -> Option<(usize, usize)> {
        self.matches.get(self.current_match).copied()
    }

    /// Replace the current match.
    ///
    /// Regex mode expands `$1`-style group references. Returns the new text
    /// and the cursor just after the replacement, then refreshes the match
    /// list and selects the next match after the cursor.
    pub fn replace_current(&mut self, text: &str) -> Option<(String, usize)> {
        let (start, end) = self.current_match_position()?;
        let re = self.build_regex().ok()?;
        let (byte_start, byte_end) = (char_to_byte(text, start), char_to_byte(text, end));

        let replacement = if self.use_regex {
            let caps = re.captures_at(text, byte_start)?;
            let mut expanded = String::new();
            caps.expand(&self.replace_term, &mut expanded);
            expanded
        } else {
            self.replace_term.clone()
        };

        let new_text = format!("{}{}{}", &text[..byte_start], replacement, &text[byte_end..]);
        let cursor = start + replacement.chars().count();

        self.find_matches(&new_text);
        self.select_from(cursor);
        Some((new_text, cursor))
    }

    /// Replace every match. Returns the new text and the replacement count.
    pub fn replace_all(&mut self, text: &str) -> (String, usize) {
        let Ok(re) = self.build_regex() else {
            return (text.to_string(), 0);
        };
        if self.search_term.is_empty() {
            return (text.to_string(), 0);
        }
        let count = self.find_matches(text);
        let new_text = if self.use_regex {
            re.replace_all(text, self.replace_term.as_str())
        } else {
            re.replace_all(text, NoExpand(&self.replace_term))
        }
        .into_owned();
        self.find_matches(&new_text);
        (new_text, count)
    }

    /// Clear all matches and reset state.
    pub fn clear(&mut self) {
        self.matches.clear();
        self.current_match = 0;
        self.error = None;
    }

    /// Check if there are any matches.
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Get the total number of matches.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn state(term: &str) -> FindState {
        FindState {
            search_term: term.to_string(),
            ..FindState::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Finding
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_find_case_insensitive_by_default() {
        let mut find = state("hello");
        assert_eq!(find.find_matches("Hello hello HELLO"), 3);
        assert_eq!(find.matches[1], (6, 11));

        find.case_sensitive = true;
        assert_eq!(find.find_matches("Hello hello HELLO"), 1);
    }

    #[test]
    fn test_literal_terms_are_escaped() {
        let mut find = state("a.b");
        assert_eq!(find.find_matches("a.b axb"), 1);
        let mut find = state("| A |");
        assert_eq!(find.find_matches("| A | B |\n| A |"), 2);
    }

    #[test]
    fn test_whole_word() {
        let mut find = state("cat");
        find.whole_word = true;
        assert_eq!(find.find_matches("cat concat cat_ cats cat"), 2);
    }

    #[test]
    fn test_regex_and_invalid_regex() {
        let mut find = state(r"\d+");
        find.use_regex = true;
        assert_eq!(find.find_matches("a1 b22 c333"), 3);

        find.search_term = "(unclosed".to_string();
        assert_eq!(find.find_matches("anything"), 0);
        assert!(find.error.is_some());
    }

    #[test]
    fn test_positions_are_characters() {
        let mut find = state("bær");
        find.find_matches("blåbær og bær");
        assert_eq!(find.matches, vec![(3, 6), (10, 13)]);
    }

    #[test]
    fn test_empty_regex_matches_skipped() {
        let mut find = state("x*");
        find.use_regex = true;
        assert_eq!(find.find_matches("abxxc"), 1);
        assert_eq!(find.matches, vec![(2, 4)]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_next_prev_wrap() {
        let mut find = state("a");
        find.find_matches("a a a");
        assert_eq!(find.next_match(), Some(1));
        assert_eq!(find.next_match(), Some(2));
        assert_eq!(find.next_match(), Some(0));
        assert_eq!(find.prev_match(), Some(2));
    }

    #[test]
    fn test_select_from_cursor() {
        let mut find = state("x");
        find.find_matches("x..x..x");
        assert_eq!(find.select_from(2), Some((3, 4)));
        assert_eq!(find.select_from(7), Some((0, 1)));
    }

    #[test]
    fn test_navigation_without_matches() {
        let mut find = state("zzz");
        find.find_matches("abc");
        assert_eq!(find.next_match(), None);
        assert_eq!(find.prev_match(), None);
        assert_eq!(find.current_match_position(), None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replacing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_current() {
        let mut find = state("cat");
        find.replace_term = "dog".to_string();
        find.find_matches("cat and cat");
        find.next_match();

        let (text, cursor) = find.replace_current("cat and cat").unwrap();
        assert_eq!(text, "cat and dog");
        assert_eq!(cursor, 11);
        assert_eq!(find.match_count(), 1);
    }

    #[test]
    fn test_replace_all_literal_does_not_expand() {
        let mut find = state("x");
        find.replace_term = "$0".to_string();
        let (text, count) = find.replace_all("x-x");
        assert_eq!(text, "$0-$0");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_replace_all_regex_groups() {
        let mut find = state(r"(\w+)@(\w+)");
        find.use_regex = true;
        find.case_sensitive = true;
        find.replace_term = "$2 at $1".to_string();
        let (text, count) = find.replace_all("ada@home bob@work");
        assert_eq!(text, "home at ada work at bob");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_replace_with_empty_term_is_noop() {
        let mut find = state("");
        assert_eq!(find.replace_all("abc"), ("abc".to_string(), 0));
        assert!(find.replace_current("abc").is_none());
    }
}
