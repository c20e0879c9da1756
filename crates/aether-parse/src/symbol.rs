//! Grammar symbols as they appear inside a `ParsingState`'s matched string.

use aether_lex::TagId;

use crate::nonterm::NontermId;

/// Either a terminal tag or a nonterminal, exactly as `TransmuterParsingState.string`
/// holds `type[TransmuterTerminalTag | TransmuterNonterminalType]` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TagId),
    Nonterminal(NontermId),
}
