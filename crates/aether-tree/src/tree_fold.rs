//! Ascend-only reduction over a tree. Ported from `TransmuterTreeFold`; the
//! single-children-list counterpart of [`crate::fold::BsrFold`].

use std::collections::VecDeque;

use crate::node::TreeNode;
use crate::tree_visitor::TreeVisitor;

pub trait TreeFold<T> {
    fn fold_internal(&mut self, node: &TreeNode, children: Vec<T>) -> Option<T>;

    fn fold_external(&mut self, node: &TreeNode) -> Option<T>;
}

pub struct TreeFoldRunner<T, F> {
    pub folder: F,
    fold_queue: VecDeque<Vec<Option<T>>>,
}

impl<T, F: TreeFold<T>> TreeFoldRunner<T, F> {
    pub fn new(folder: F) -> Self {
        TreeFoldRunner {
            folder,
            fold_queue: VecDeque::new(),
        }
    }
}

impl<T: Clone, F: TreeFold<T>> TreeFoldRunner<T, F> {
    pub fn fold_s(&self) -> Option<T> {
        self.fold_queue.front()?.first()?.clone()
    }
}

impl<T, F: TreeFold<T>> TreeVisitor for TreeFoldRunner<T, F> {
    fn top_before(&mut self, _root: &TreeNode) {
        self.fold_queue = VecDeque::new();
    }

    fn ascend(&mut self, nodes: &[TreeNode], _level_changed: bool) {
        let mut level = Vec::with_capacity(nodes.len());

        for node in nodes {
            let value = if node.children().is_empty() {
                self.folder.fold_external(node)
            } else {
                let children: Vec<T> = self
                    .fold_queue
                    .pop_back()
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect();
                self.folder.fold_internal(node, children)
            };

            level.push(value);
        }

        self.fold_queue.push_front(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_tree::bsr_to_tree;
    use crate::tree_visitor::run_tree_visitor;

    struct Depth;

    impl TreeFold<usize> for Depth {
        fn fold_internal(&mut self, _node: &TreeNode, children: Vec<usize>) -> Option<usize> {
            Some(1 + children.into_iter().max().unwrap_or(0))
        }

        fn fold_external(&mut self, _node: &TreeNode) -> Option<usize> {
            Some(1)
        }
    }

    #[test]
    fn depth_of_flat_sequence_is_two() {
        let (bsr, lexer) = crate::test_support::sequence_parse("ab");
        let tree = bsr_to_tree(&bsr, &lexer).unwrap().expect("tree produced");
        let mut fold = TreeFoldRunner::new(Depth);
        run_tree_visitor(&mut fold, &tree);
        assert_eq!(fold.fold_s(), Some(2));
    }
}
