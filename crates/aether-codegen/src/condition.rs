//! `ConditionFold`: lowers a [`ConditionTree`] to a Python boolean
//! expression, reading names back out of a [`ConditionTable`] so the emitted
//! text reads `Condition.Foo in conditions` rather than a bare bit index.
//!
//! A `TreeFold<String>` in spirit (spec.md §4.5): it always returns a single
//! string, folding leaves up exactly like [`crate::expression::ExpressionFold`]
//! does for production bodies.

use aether_core::ConditionTree;
use aether_sem::conditions::ConditionTable;

/// Folds `tree` into a Python expression over a runtime-provided
/// `conditions: Condition` flag set.
///
/// Double negation cancels at the tree level rather than textually: `Not(Not(x))`
/// matches its inner `Not` directly and unwraps one layer before folding,
/// instead of emitting `not (not (...))` and relying on a later text pass.
pub fn fold_condition(tree: &ConditionTree, conditions: &ConditionTable) -> String {
    match tree {
        ConditionTree::Id(id) => {
            let name = conditions.name(*id).unwrap_or("Unknown");
            format!("Condition.{} in conditions", crate::python::escape_ident(name))
        }
        ConditionTree::Not(inner) => match inner.as_ref() {
            ConditionTree::Not(doubly_inner) => fold_condition(doubly_inner, conditions),
            _ => format!("not ({})", fold_condition(inner, conditions)),
        },
        ConditionTree::And(parts) => fold_chain(parts, " and ", conditions),
        ConditionTree::Or(parts) => fold_chain(parts, " or ", conditions),
    }
}

fn fold_chain(parts: &[ConditionTree], joiner: &str, conditions: &ConditionTable) -> String {
    if parts.is_empty() {
        return "True".to_string();
    }

    parts
        .iter()
        .map(|p| match p {
            ConditionTree::Or(_) | ConditionTree::And(_) => format!("({})", fold_condition(p, conditions)),
            _ => fold_condition(p, conditions),
        })
        .collect::<Vec<_>>()
        .join(joiner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_negation_cancels() {
        let mut table = ConditionTable::default();
        let id = table.id("Debug");
        let tree = ConditionTree::Not(Box::new(ConditionTree::Not(Box::new(ConditionTree::Id(id)))));
        assert_eq!(fold_condition(&tree, &table), "Condition.Debug in conditions");
    }

    #[test]
    fn single_negation_wraps_in_not() {
        let mut table = ConditionTable::default();
        let id = table.id("Debug");
        let tree = ConditionTree::Not(Box::new(ConditionTree::Id(id)));
        assert_eq!(fold_condition(&tree, &table), "not (Condition.Debug in conditions)");
    }

    #[test]
    fn or_parenthesizes_nested_and() {
        let mut table = ConditionTable::default();
        let a = table.id("A");
        let b = table.id("B");
        let c = table.id("C");
        let tree = ConditionTree::Or(vec![
            ConditionTree::Id(a),
            ConditionTree::And(vec![ConditionTree::Id(b), ConditionTree::Id(c)]),
        ]);
        assert_eq!(
            fold_condition(&tree, &table),
            "Condition.A in conditions or (Condition.B in conditions and Condition.C in conditions)"
        );
    }
}
