//! Concrete tree nodes: the shape `aether-sem` and `aether-codegen` actually
//! walk, once a BSR has been pruned, disambiguated, and converted. Ported
//! from `TransmuterTerminalTreeNode`/`TransmuterNonterminalTreeNode`.

use aether_core::Position;
use aether_lex::{TagId, TerminalId};
use aether_parse::NontermId;

/// A node in a concrete tree. Positions are stored explicitly (rather than
/// derived on every access) because codegen transformations synthesize and
/// splice nodes whose positions need recomputing afterward; see
/// [`crate::position_fixer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Terminal {
        tag: TagId,
        terminal: TerminalId,
        start_position: Position,
        end_position: Position,
    },
    Nonterminal {
        type_: NontermId,
        start_position: Position,
        end_position: Position,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn start_position(&self) -> &Position {
        match self {
            TreeNode::Terminal { start_position, .. } => start_position,
            TreeNode::Nonterminal { start_position, .. } => start_position,
        }
    }

    pub fn end_position(&self) -> &Position {
        match self {
            TreeNode::Terminal { end_position, .. } => end_position,
            TreeNode::Nonterminal { end_position, .. } => end_position,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Terminal { .. } => &[],
            TreeNode::Nonterminal { children, .. } => children,
        }
    }
}
