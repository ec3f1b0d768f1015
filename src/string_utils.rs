//! Character-offset helpers
//!
//! The editor widget reports cursor positions as character indices, while
//! Rust strings are sliced by byte. Everything that crosses that boundary
//! goes through these helpers so that a cursor landing inside a multi-byte
//! character (`ø`, `中`, `🎉`) clamps instead of panicking.

// ─────────────────────────────────────────────────────────────────────────────
// Boundaries
// ─────────────────────────────────────────────────────────────────────────────

/// Largest byte index `<= index` that lies on a character boundary.
///
/// Indices past the end clamp to `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// ─────────────────────────────────────────────────────────────────────────────
// Char <-> Byte Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Number of characters in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index into a byte index, clamping to `s.len()`.
pub fn char_to_byte(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Convert a byte index into a character index.
///
/// A byte index in the middle of a character counts as that character's start.
pub fn byte_to_char(s: &str, byte_index: usize) -> usize {
    let byte_index = floor_char_boundary(s, byte_index);
    s[..byte_index].chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Line / Column
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index to a 0-based `(line, column)` pair.
pub fn char_to_line_col(s: &str, char_index: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for ch in s.chars().take(char_index) {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_norwegian() {
        // 'å' occupies bytes 5..7
        let s = "Hei på deg";
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(floor_char_boundary(s, 7), 7);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }

    #[test]
    fn test_char_to_byte_multibyte() {
        let s = "a你b";
        assert_eq!(char_to_byte(s, 0), 0);
        assert_eq!(char_to_byte(s, 1), 1);
        assert_eq!(char_to_byte(s, 2), 4);
        assert_eq!(char_to_byte(s, 3), 5);
        assert_eq!(char_to_byte(s, 99), 5);
    }

    #[test]
    fn test_byte_to_char_mid_character() {
        let s = "🎉x";
        assert_eq!(byte_to_char(s, 0), 0);
        assert_eq!(byte_to_char(s, 2), 0);
        assert_eq!(byte_to_char(s, 4), 1);
        assert_eq!(byte_to_char(s, 5), 2);
    }

    #[test]
    fn test_char_to_line_col() {
        let s = "first\nsecønd\n\nlast";
        assert_eq!(char_to_line_col(s, 0), (0, 0));
        assert_eq!(char_to_line_col(s, 5), (0, 5));
        assert_eq!(char_to_line_col(s, 6), (1, 0));
        assert_eq!(char_to_line_col(s, 10), (1, 4));
        assert_eq!(char_to_line_col(s, 13), (2, 0));
        assert_eq!(char_to_line_col(s, 99), (3, 4));
    }
}
