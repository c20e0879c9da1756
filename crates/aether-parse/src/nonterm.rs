//! Nonterminal definitions.
//!
//! Mirrors `tag.rs`'s value-with-named-function-fields model (spec.md §9):
//! a nonterminal is discovered at run time from a compiled syntactic symbol
//! table, so its hooks are closures rather than methods on a Rust type per
//! grammar symbol.
//!
//! `descend` is the one hook that must call back into the engine itself
//! (`Parser::call`, recursively, to match the nonterterminal's production
//! body) so it is reference-counted rather than boxed: `call_single_nonterminal_type`
//! needs to clone it out of the `nonterminals` list before invoking it with
//! `&mut Parser`, since the list lives behind that same `&mut` borrow.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use aether_core::ConditionSet;

use crate::parser::{Backtrack, Parser};
use crate::state::ParsingState;

/// Dense id of one nonterminal, assigned by whoever builds the `NontermDef`
/// list (a test, or the syntactic symbol table).
pub type NontermId = u32;

pub struct NontermDef {
    pub id: NontermId,
    pub name: String,
    pub start: Box<dyn Fn(&ConditionSet) -> bool>,
    pub first: Box<dyn Fn(&ConditionSet) -> Vec<NontermId>>,
    /// Attempts one parse of this nonterminal's production body starting at
    /// the given (empty-string) state, returning every distinct way it can
    /// be derived from that point. Calls back into `Parser::call` to match
    /// the alternatives, sequences, and iterations of the body.
    pub descend: Rc<dyn Fn(&mut Parser, ParsingState) -> Result<HashSet<ParsingState>, Backtrack>>,
}

impl fmt::Debug for NontermDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NontermDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
