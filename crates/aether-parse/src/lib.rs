//! Parser engine (component C3): memoized recursive-descent-with-ascent
//! parsing of ambiguous, left-recursive grammars into a Binary Subtree
//! Representation.

pub mod bsr;
pub mod nonterm;
pub mod parser;
pub mod state;
pub mod symbol;

pub use bsr::{Bsr, Epn};
pub use nonterm::{NontermDef, NontermId};
pub use parser::{Ascend, Backtrack, Parser};
pub use state::ParsingState;
pub use symbol::Symbol;
