//! `ExpressionFold`: a `TreeFold<string>` lowering one production body to a
//! single Python expression — a chain of `engine.*` combinator calls, each
//! taking a state set and returning the state set reachable after matching
//! that fragment. `descend` just applies the root expression to `{state}`.
//!
//! - Selection (`|`) folds to `engine.unordered_selection([...], states)`:
//!   try every alternative, union what succeeds.
//! - Ordered selection (`/`) folds to `engine.ordered_selection([...], states)`:
//!   try each in turn, commit to the first that doesn't backtrack.
//! - Iteration/optional fold to bounded-loop combinators that swallow the
//!   framework's internal backtracking error themselves.
//! - An identifier reference folds to `engine.call(id, states, ascend=...)`;
//!   `ascend` is set when the reference is to the production's own
//!   nonterminal, the one case spec.md §4.2's left-recursion ascent applies.

use std::collections::HashMap;

use aether_core::ConditionTree;
use aether_sem::ast::{CondExpr, Pattern};
use aether_sem::conditions::ConditionTable;

use crate::condition::fold_condition;

/// Re-derives a [`ConditionTree`] from a condition guard's AST using ids
/// already assigned in `conditions` — codegen runs after every condition
/// name in both grammar files has been scanned, so this never needs to
/// intern a new one.
fn cond_expr_to_tree(expr: &CondExpr, conditions: &ConditionTable) -> ConditionTree {
    match expr {
        CondExpr::Name(n) => {
            let name = n.name().map(|t| t.text().to_string()).unwrap_or_default();
            ConditionTree::Id(conditions.get(&name).unwrap_or(0))
        }
        CondExpr::Not(n) => ConditionTree::Not(Box::new(
            n.operand().map(|e| cond_expr_to_tree(&e, conditions)).unwrap_or(ConditionTree::And(vec![])),
        )),
        CondExpr::Paren(n) => n.inner().map(|e| cond_expr_to_tree(&e, conditions)).unwrap_or(ConditionTree::And(vec![])),
        CondExpr::And(n) => ConditionTree::And(n.operands().map(|e| cond_expr_to_tree(&e, conditions)).collect()),
        CondExpr::Or(n) => ConditionTree::Or(n.operands().map(|e| cond_expr_to_tree(&e, conditions)).collect()),
    }
}

/// Folds `pattern` into a Python expression of type
/// `Callable[[FrozenSet[ParsingState]], FrozenSet[ParsingState]]`.
///
/// `owner` is the defining nonterminal's name (to detect self-reference for
/// `ascend`); `ids` maps every terminal and nonterminal name to its emitted
/// integer id.
pub fn fold_pattern(
    pattern: &Pattern,
    owner: &str,
    ids: &HashMap<&str, u32>,
    conditions: &ConditionTable,
) -> String {
    match pattern {
        Pattern::IdentRef(r) => {
            let name = r.name().map(|t| t.text().to_string()).unwrap_or_default();
            let id = ids.get(name.as_str()).copied().unwrap_or(0);
            let ascend = name == owner;
            format!("(lambda states: engine.call({id}, states, ascend={}))", py_bool(ascend))
        }
        Pattern::Literal(lit) => {
            let text = lit.token().map(|t| t.text().to_string()).unwrap_or_default();
            format!("(lambda states: engine.match_literal(states, {text:?}))")
        }
        Pattern::Wildcard(_) => "(lambda states: engine.match_wildcard(states))".to_string(),
        Pattern::Bracket(b) => {
            let text = b.token().map(|t| t.text().to_string()).unwrap_or_default();
            format!("(lambda states: engine.match_bracket(states, {text:?}))")
        }
        Pattern::Selection(s) => {
            let alts: Vec<String> = s.alternatives().map(|a| fold_pattern(&a, owner, ids, conditions)).collect();
            format!("(lambda states: engine.unordered_selection([{}], states))", alts.join(", "))
        }
        Pattern::OrderedSelection(s) => {
            let alts: Vec<String> = s.alternatives().map(|a| fold_pattern(&a, owner, ids, conditions)).collect();
            format!("(lambda states: engine.ordered_selection([{}], states))", alts.join(", "))
        }
        Pattern::Sequence(seq) => {
            let terms: Vec<String> = seq.terms().map(|t| fold_pattern(&t, owner, ids, conditions)).collect();
            format!("(lambda states: engine.sequence([{}], states))", terms.join(", "))
        }
        Pattern::IterationGroup(g) => {
            let body = g.body().map(|b| fold_pattern(&b, owner, ids, conditions)).unwrap_or_else(|| "(lambda states: states)".to_string());
            match g.condition().and_then(|c| c.expr()) {
                Some(expr) => format!(
                    "(lambda states: engine.iterate({body}, states) if {} else states)",
                    fold_condition(&cond_expr_to_tree(&expr, conditions), conditions)
                ),
                None => format!("(lambda states: engine.iterate({body}, states))"),
            }
        }
        Pattern::OptionalGroup(g) => {
            let body = g.body().map(|b| fold_pattern(&b, owner, ids, conditions)).unwrap_or_else(|| "(lambda states: states)".to_string());
            format!("(lambda states: engine.optional({body}, states))")
        }
        Pattern::Repeat(r) => {
            let body = r.body().map(|b| fold_pattern(&b, owner, ids, conditions)).unwrap_or_else(|| "(lambda states: states)".to_string());
            let Some(op) = r.operator() else {
                return body;
            };

            match op.kind() {
                aether_sem::cst::SyntaxKind::Question => format!("(lambda states: engine.optional({body}, states))"),
                aether_sem::cst::SyntaxKind::Star => format!("(lambda states: engine.iterate({body}, states))"),
                aether_sem::cst::SyntaxKind::Plus => {
                    format!("(lambda states: engine.sequence([{body}, (lambda s: engine.iterate({body}, s))], states))")
                }
                aether_sem::cst::SyntaxKind::RepeatRange => {
                    let text = op.text();
                    let inner = &text[1..text.len() - 1];
                    let mut parts = inner.splitn(2, ',');
                    let m: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let n = match parts.next() {
                        None => format!("{m}"),
                        Some("") => "None".to_string(),
                        Some(s) => s.to_string(),
                    };
                    format!("(lambda states: engine.repeat_range({body}, states, {m}, {n}))")
                }
                _ => body,
            }
        }
    }
}

fn py_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}
