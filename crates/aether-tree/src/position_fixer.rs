//! Keeps a tree's stored positions consistent with its children after a
//! transformation splices or reorders nodes. Ported from
//! `TransmuterTreePositionFixer`/`TransmuterTreePositionUnfixer`: the fixer
//! recomputes a parent's span bottom-up from its children; the unfixer
//! propagates a parent's (possibly just-edited) start position back down,
//! chaining each child's start from the previous sibling's end.

use aether_core::Position;

use crate::node::TreeNode;

fn set_start_position(node: &mut TreeNode, position: Position) {
    match node {
        TreeNode::Terminal { start_position, .. } => *start_position = position,
        TreeNode::Nonterminal { start_position, .. } => *start_position = position,
    }
}

fn set_end_position(node: &mut TreeNode, position: Position) {
    match node {
        TreeNode::Terminal { end_position, .. } => *end_position = position,
        TreeNode::Nonterminal { end_position, .. } => *end_position = position,
    }
}

/// Recomputes every `Nonterminal`'s span from its children, bottom-up.
/// Terminal spans never drift (they're read straight off the lexer's
/// terminal arena), so this only ever touches `Nonterminal` nodes.
pub fn fix_positions(node: &mut TreeNode) {
    if let TreeNode::Nonterminal { children, .. } = node {
        for child in children.iter_mut() {
            fix_positions(child);
        }
    }

    if let TreeNode::Nonterminal { children, .. } = node {
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            let start = first.start_position().clone();
            let end = last.end_position().clone();
            set_start_position(node, start);
            set_end_position(node, end);
            return;
        }
    }
}

/// The inverse: pushes a `Nonterminal`'s (possibly just-edited) start
/// position down into its first child, then chains every later child's
/// start from the previous sibling's end. Top-down, unlike `fix_positions`.
pub fn unfix_positions(node: &mut TreeNode) {
    if let TreeNode::Nonterminal { start_position, children, .. } = node {
        let parent_start = start_position.clone();

        if let Some(first) = children.first_mut() {
            set_start_position(first, parent_start);
        }

        for i in 1..children.len() {
            let prev_end = children[i - 1].end_position().clone();
            set_start_position(&mut children[i], prev_end);
        }

        for child in children.iter_mut() {
            unfix_positions(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_tree::bsr_to_tree;

    #[test]
    fn fix_and_unfix_are_idempotent_on_an_already_consistent_tree() {
        let (bsr, lexer) = crate::test_support::sequence_parse("ab");
        let mut tree = bsr_to_tree(&bsr, &lexer).unwrap().expect("tree produced");
        let before = tree.clone();

        fix_positions(&mut tree);
        assert_eq!(tree, before);

        unfix_positions(&mut tree);
        assert_eq!(tree, before);
    }
}
