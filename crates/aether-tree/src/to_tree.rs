//! Converts a (pruned, disambiguated) [`Bsr`] into a [`TreeNode`] forest.
//! Ported from `TransmuterBSRToTreeConverter`.
//!
//! Built on [`BsrFold`] rather than re-deriving the ascend bookkeeping: each
//! EPN folds to a *list* of sibling tree nodes rather than a single node,
//! since a `Partial`-keyed EPN (mid-production, `type_` unset) is scaffolding
//! that contributes its accumulated children straight to its parent, and
//! only a `Nonterm`-keyed EPN (`type_` set) actually wraps that list into one
//! [`TreeNode::Nonterminal`].

use aether_core::AetherResult;
use aether_lex::Lexer;
use aether_parse::{Bsr, Epn, Symbol};

use crate::bsr_visitor::run_bsr_visitor;
use crate::fold::{BsrFold, Fold};
use crate::node::TreeNode;

struct ToTreeConverter;

impl Fold<Vec<TreeNode>> for ToTreeConverter {
    fn fold_internal(
        &mut self,
        _bsr: &Bsr,
        lexer: &Lexer,
        epn: &Epn,
        left: Vec<Vec<TreeNode>>,
        right: Vec<Vec<TreeNode>>,
    ) -> Option<Vec<TreeNode>> {
        let mut children: Vec<TreeNode> = left.into_iter().flatten().collect();

        match epn.state.string.last() {
            Some(Symbol::Terminal(tag)) => {
                // Terminals never get a `right_children` bucket of their
                // own; their lexeme comes straight from `end_terminal`.
                if let Some(terminal_id) = epn.state.end_terminal {
                    let terminal = lexer.terminal(terminal_id);
                    children.push(TreeNode::Terminal {
                        tag: *tag,
                        terminal: terminal_id,
                        start_position: terminal.start_position.clone(),
                        end_position: terminal.end_position.clone(),
                    });
                }
            }
            _ => children.extend(right.into_iter().flatten()),
        }

        Some(wrap(epn, children))
    }

    fn fold_external(&mut self, _bsr: &Bsr, lexer: &Lexer, epn: &Epn) -> Option<Vec<TreeNode>> {
        match (epn.type_, epn.state.string.last()) {
            // A completed nonterminal with no children: an empty (possibly
            // optional) production.
            (Some(_), _) => Some(wrap(epn, Vec::new())),
            (None, Some(Symbol::Terminal(tag))) => {
                let terminal_id = epn.state.end_terminal?;
                let terminal = lexer.terminal(terminal_id);
                Some(vec![TreeNode::Terminal {
                    tag: *tag,
                    terminal: terminal_id,
                    start_position: terminal.start_position.clone(),
                    end_position: terminal.end_position.clone(),
                }])
            }
            (None, _) => None,
        }
    }
}

fn wrap(epn: &Epn, children: Vec<TreeNode>) -> Vec<TreeNode> {
    let Some(type_) = epn.type_ else {
        return children;
    };

    let end_position = children
        .last()
        .map(|child| child.end_position().clone())
        .unwrap_or_else(|| epn.state.start_position.clone());

    vec![TreeNode::Nonterminal {
        type_,
        start_position: epn.state.start_position.clone(),
        end_position,
        children,
    }]
}

/// Converts the accepted derivation of `bsr` into a single root [`TreeNode`].
/// Expects `bsr` to already be pruned and disambiguated: an EPN bucket with
/// more than one entry folds every alternative in an unspecified order
/// rather than rejecting the ambiguity, so callers that care should run
/// [`crate::disambiguator::Disambiguator`] first.
pub fn bsr_to_tree(bsr: &Bsr, lexer: &Lexer) -> AetherResult<Option<TreeNode>> {
    let mut fold = BsrFold::new(ToTreeConverter);
    run_bsr_visitor(&mut fold, bsr, lexer);
    Ok(fold.fold_s().and_then(|nodes| nodes.into_iter().next()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_grammar_converts_to_two_terminal_children() {
        let (bsr, lexer) = crate::test_support::sequence_parse("ab");
        let tree = bsr_to_tree(&bsr, &lexer).unwrap().expect("tree produced");
        let TreeNode::Nonterminal { children, start_position, end_position, .. } = &tree else {
            panic!("root is a nonterminal");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], TreeNode::Terminal { .. }));
        assert!(matches!(children[1], TreeNode::Terminal { .. }));
        assert_eq!(start_position.index, 0);
        assert_eq!(end_position.index, 2);
    }
}
