//! In-flight parsing states, the units `Parser::call` threads through.

use aether_core::Position;
use aether_lex::TerminalId;

use crate::symbol::Symbol;

/// One partial (or complete) derivation of a symbol string, per
/// `TransmuterParsingState`.
///
/// `end_terminal` is `None` only for the very first state of a call, before
/// any terminal has been consumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsingState {
    pub string: Vec<Symbol>,
    pub start_position: Position,
    pub split_position: Position,
    pub end_terminal: Option<TerminalId>,
}
