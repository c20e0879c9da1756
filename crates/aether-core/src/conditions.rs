//! Named boolean conditions that select grammar fragments for a given run.
//!
//! The original `TransmuterConditions` is a Python `IntFlag` generated with
//! one member per condition name found in the grammar. Since the set of
//! condition names isn't known until the grammar is read, we model the same
//! idea as a dense bitset over condition ids assigned by the symbol-table
//! builder, capped at 64 simultaneously live conditions per run (grammars
//! needing more than that are not a realistic target for this generator).

use std::fmt;

/// Dense id of one named condition, assigned in declaration order.
pub type ConditionId = u32;

/// A set of active conditions, evaluated by tag/nonterminal `start`/`ignore`
/// predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConditionSet(u64);

impl ConditionSet {
    pub const fn empty() -> Self {
        ConditionSet(0)
    }

    pub fn with(mut self, id: ConditionId) -> Self {
        self.0 |= 1 << id;
        self
    }

    pub fn contains(&self, id: ConditionId) -> bool {
        self.0 & (1 << id) != 0
    }

    pub fn union(&self, other: &ConditionSet) -> ConditionSet {
        ConditionSet(self.0 | other.0)
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}

/// A boolean expression over condition ids, as used by a tag's `ignore` flag
/// (spec.md §3: "boolean or condition tree") and by the code generator's
/// `ConditionFold` (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionTree {
    Id(ConditionId),
    Not(Box<ConditionTree>),
    And(Vec<ConditionTree>),
    Or(Vec<ConditionTree>),
}

impl ConditionTree {
    /// Evaluates this tree against an active condition set. Used by the
    /// engines directly (for direct Rust-level testing) and mirrored by
    /// `ConditionFold` when emitting the same logic as target-language
    /// source.
    pub fn eval(&self, conditions: &ConditionSet) -> bool {
        match self {
            ConditionTree::Id(id) => conditions.contains(*id),
            ConditionTree::Not(inner) => !inner.eval(conditions),
            ConditionTree::And(parts) => parts.iter().all(|p| p.eval(conditions)),
            ConditionTree::Or(parts) => parts.iter().any(|p| p.eval(conditions)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_set_tracks_membership() {
        let set = ConditionSet::empty().with(0).with(3);
        assert!(set.contains(0));
        assert!(set.contains(3));
        assert!(!set.contains(1));
    }

    #[test]
    fn condition_tree_double_negation() {
        let tree = ConditionTree::Not(Box::new(ConditionTree::Not(Box::new(ConditionTree::Id(0)))));
        let set = ConditionSet::empty().with(0);
        assert!(tree.eval(&set));
    }

    #[test]
    fn condition_tree_and_or() {
        let set = ConditionSet::empty().with(1);
        let and = ConditionTree::And(vec![ConditionTree::Id(0), ConditionTree::Id(1)]);
        assert!(!and.eval(&set));
        let or = ConditionTree::Or(vec![ConditionTree::Id(0), ConditionTree::Id(1)]);
        assert!(or.eval(&set));
    }
}
