//! Lexer engine (component C2): parallel-NFA, longest-match, tag-closure
//! tokenization shared by every Aether-generated front end.

pub mod lexer;
pub mod tag;
pub mod terminal;

pub use lexer::Lexer;
pub use tag::{LexState, TagDef, TagId};
pub use terminal::{Terminal, TerminalId};
