//! Matched terminals.

use aether_core::Position;

use crate::tag::TagId;

/// Dense arena index of a matched terminal within one `Lexer` instance.
pub type TerminalId = usize;

/// A single matched token, per spec.md §3 ("Terminal (token)").
///
/// The original's mutable `next` pointer is dropped entirely (spec.md §9):
/// the lexer's arena is append-only and in lexing order, so "the terminal
/// after this one" is just the next arena slot, computed lazily by
/// `Lexer::next_terminal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub tags: Vec<TagId>,
    pub value: String,
    pub start_position: Position,
    pub end_position: Position,
}

impl Terminal {
    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}
