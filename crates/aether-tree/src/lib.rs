//! BSR/tree visitor framework (component C4): the standard derivatives
//! every later stage builds on — pruning, disambiguation, ascend-only folds,
//! and BSR-to-tree (and tree-level) traversal, ported from
//! `transmuter.front.semantic.common`.

pub mod bsr_visitor;
pub mod disambiguator;
pub mod fold;
pub mod node;
pub mod position_fixer;
pub mod pruner;
pub mod to_tree;
pub mod tree_fold;
pub mod tree_visitor;

#[cfg(test)]
mod test_support;

pub use bsr_visitor::{run_bsr_visitor, BsrVisitor};
pub use disambiguator::Disambiguator;
pub use fold::{BsrFold, Fold};
pub use node::TreeNode;
pub use position_fixer::{fix_positions, unfix_positions};
pub use pruner::Pruner;
pub use to_tree::bsr_to_tree;
pub use tree_fold::{TreeFold, TreeFoldRunner};
pub use tree_visitor::{run_tree_visitor, TreeVisitor};
