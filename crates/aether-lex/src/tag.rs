//! Terminal tag definitions.
//!
//! A tag is modeled as a value with named function fields rather than a
//! class, per spec.md §9 ("Class-per-terminal ... model as a value with
//! named function fields keyed by a compact integer id"). Since grammars are
//! discovered at run time (either hand-built in a test, or compiled from a
//! grammar's lexical symbol table by `aether-sem`), the function fields are
//! boxed closures rather than `fn` pointers, letting a single generic NFA
//! stepper close over a per-tag compiled transition table.

use std::fmt;

use aether_core::ConditionSet;

/// Dense id of one terminal tag, assigned by whoever builds the `TagDef`
/// list (a test, or the lexical symbol table).
pub type TagId = u32;

/// A bitmask of up to 64 simultaneously live NFA states for one tag.
/// State `0` conventionally means "this tag's automaton is dead."
pub type LexState = u64;

/// The per-tag hook bundle from spec.md §3 ("Terminal tag").
pub struct TagDef {
    pub id: TagId,
    pub name: String,
    pub states_start: LexState,
    pub start: Box<dyn Fn(&ConditionSet) -> bool>,
    pub ignore: Box<dyn Fn(&ConditionSet) -> bool>,
    pub positives: Box<dyn Fn(&ConditionSet) -> Vec<TagId>>,
    pub negatives: Box<dyn Fn(&ConditionSet) -> Vec<TagId>>,
    /// One NFA transition step: given the tag's current live-state bitmask
    /// and the next input character, returns whether this step lands on an
    /// accepting state and the (possibly empty) successor state bitmask.
    pub nfa: Box<dyn Fn(LexState, char) -> (bool, LexState)>,
}

impl fmt::Debug for TagDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagDef")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TagDef {
    /// Convenience constructor for tags that are always in the active
    /// alphabet, never ignored, and have no positive/negative relationships
    /// — the common case for hand-written test grammars.
    pub fn simple(
        id: TagId,
        name: impl Into<String>,
        states_start: LexState,
        nfa: impl Fn(LexState, char) -> (bool, LexState) + 'static,
    ) -> Self {
        TagDef {
            id,
            name: name.into(),
            states_start,
            start: Box::new(|_| true),
            ignore: Box::new(|_| false),
            positives: Box::new(|_| Vec::new()),
            negatives: Box::new(|_| Vec::new()),
            nfa: Box::new(nfa),
        }
    }
}
