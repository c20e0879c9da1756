//! The Binary Subtree Representation: the shared-packed-forest output of a
//! parse, from which `aether-tree` later derives one or more concrete trees.
//!
//! Ported from `TransmuterEPN`/`TransmuterBSR`. Two kinds of entries live in
//! the same map, distinguished by key shape: a completed nonterminal
//! derivation is keyed by its nonterminal id alone (`BsrKey::Nonterm`); an
//! in-progress (or terminal) derivation is keyed by its full symbol string
//! (`BsrKey::Partial`), matching the original's `epn.type_ if epn.type_ is
//! not None else epn.state.string`.

use std::collections::{HashMap, HashSet};

use aether_core::Position;
use aether_lex::Lexer;

use crate::nonterm::NontermId;
use crate::state::ParsingState;
use crate::symbol::Symbol;

/// One extended packed node: either a completed nonterminal (`type_` set)
/// or a bare parsing-state snapshot (`type_` is `None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Epn {
    pub type_: Option<NontermId>,
    pub state: ParsingState,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BsrKey {
    Nonterm(NontermId, Position, Position),
    Partial(Vec<Symbol>, Position, Position),
}

#[derive(Debug, Clone, Default)]
pub struct Bsr {
    /// The accepted derivation once `Parser::parse` succeeds: the start
    /// nonterminal spanning the whole (non-ignored) input.
    pub start: Option<(NontermId, Position, Position)>,
    epns: HashMap<BsrKey, HashSet<Epn>>,
}

impl Bsr {
    pub fn add(&mut self, epn: Epn, lexer: &Lexer) {
        let end = match epn.state.end_terminal {
            Some(id) => lexer.terminal(id).end_position.clone(),
            None => epn.state.split_position.clone(),
        };

        let key = match epn.type_ {
            Some(nonterm_id) => BsrKey::Nonterm(nonterm_id, epn.state.start_position.clone(), end),
            None => BsrKey::Partial(epn.state.string.clone(), epn.state.start_position.clone(), end),
        };

        self.epns.entry(key).or_default().insert(epn);
    }

    pub fn contains_nonterm(&self, nonterm_id: NontermId, start: &Position, end: &Position) -> bool {
        self.epns
            .contains_key(&BsrKey::Nonterm(nonterm_id, start.clone(), end.clone()))
    }

    /// Every EPN packed under one `(nonterminal, start, end)` key: more than
    /// one entry means the span is genuinely ambiguous, and `aether-tree`'s
    /// disambiguator or fold must choose (or enumerate) among them.
    pub fn nonterm_epns(&self, nonterm_id: NontermId, start: &Position, end: &Position) -> Option<&HashSet<Epn>> {
        self.epns.get(&BsrKey::Nonterm(nonterm_id, start.clone(), end.clone()))
    }

    /// EPNs deriving `parent.state.string[..len - 1]` over
    /// `[start_position, split_position)`.
    pub fn left_children(&self, parent: &Epn) -> HashSet<Epn> {
        if parent.state.string.is_empty() || parent.state.start_position == parent.state.split_position {
            return HashSet::new();
        }

        let prefix = parent.state.string[..parent.state.string.len() - 1].to_vec();
        let key = BsrKey::Partial(
            prefix,
            parent.state.start_position.clone(),
            parent.state.split_position.clone(),
        );

        self.epns.get(&key).cloned().unwrap_or_default()
    }

    /// EPNs deriving the last symbol of `parent.state.string` over
    /// `[split_position, end_terminal.end_position)`. Empty when the last
    /// symbol is a terminal tag, since terminals have no children.
    pub fn right_children(&self, parent: &Epn, lexer: &Lexer) -> HashSet<Epn> {
        let Some(end_terminal) = parent.state.end_terminal else {
            return HashSet::new();
        };
        let Some(&last) = parent.state.string.last() else {
            return HashSet::new();
        };
        let end_position = lexer.terminal(end_terminal).end_position.clone();

        if parent.state.split_position == end_position {
            return HashSet::new();
        }

        let Symbol::Nonterminal(nonterm_id) = last else {
            return HashSet::new();
        };

        let key = BsrKey::Nonterm(nonterm_id, parent.state.split_position.clone(), end_position);
        self.epns.get(&key).cloned().unwrap_or_default()
    }
}
