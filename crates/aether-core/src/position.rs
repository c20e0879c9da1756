//! Source positions.
//!
//! Mirrors `TransmuterPosition` from the original Transmuter front end:
//! a (filename, byte index, line, column) tuple that the lexer advances in
//! place as it scans, and that downstream components copy by value once a
//! terminal or derivation boundary is reached.

use std::fmt;
use std::sync::Arc;

/// A position in a source file.
///
/// `index` is a byte offset into the file's contents. `line` and `column`
/// are 1-based, matching the original's convention (`TransmuterPosition("",
/// 0, 1, 1)` is the position just before the first character).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: Arc<str>,
    pub index: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn start(file: impl Into<Arc<str>>) -> Self {
        Position {
            file: file.into(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance this position past one character, applying the line/column
    /// rules from spec.md §4.1: index and column increment by one, and
    /// `'\n'` additionally bumps the line and resets the column. No CRLF
    /// normalization happens here; that is left to the grammar's own
    /// whitespace terminal.
    pub fn advance(&mut self, ch: char) {
        self.index += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Overwrite this position in place with another's fields, matching
    /// `TransmuterPosition.update` (used so a canonical "start position"
    /// object keeps its identity while its value changes).
    pub fn update(&mut self, other: &Position) {
        self.file = other.file.clone();
        self.index = other.index;
        self.line = other.line;
        self.column = other.column;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_newlines() {
        let mut pos = Position::start("test.aether");

        for ch in "ab\ncd".chars() {
            pos.advance(ch);
        }

        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.index, 5);
    }

    #[test]
    fn display_matches_original_format() {
        let pos = Position {
            file: "f.aether".into(),
            index: 4,
            line: 1,
            column: 5,
        };

        assert_eq!(pos.to_string(), "f.aether:1:5");
    }

    #[test]
    fn update_preserves_identity_semantics() {
        let mut start = Position::start("f");
        let mut cursor = start.clone();

        for ch in "abc".chars() {
            cursor.advance(ch);
        }

        start.update(&cursor);
        assert_eq!(start.index, 3);
    }
}
