//! The tree-level analog of [`crate::bsr_visitor`]: same breadth-first,
//! level-aware descend/ascend shape, but there is exactly one children list
//! per node instead of a left/right split. Ported from
//! `TransmuterTreeVisitor`.

use std::collections::VecDeque;

use crate::node::TreeNode;

pub trait TreeVisitor {
    fn top_before(&mut self, _root: &TreeNode) {}

    fn descend(&mut self, nodes: &[TreeNode], _level_changed: bool) -> Vec<TreeNode> {
        nodes.to_vec()
    }

    fn bottom(&mut self) -> bool {
        true
    }

    fn ascend(&mut self, _nodes: &[TreeNode], _level_changed: bool) {}

    fn top_after(&mut self, _root: &TreeNode) {}
}

pub fn run_tree_visitor(visitor: &mut impl TreeVisitor, root: &TreeNode) {
    visitor.top_before(root);

    let mut descend_queue: VecDeque<Vec<TreeNode>> = VecDeque::new();
    descend_queue.push_back(vec![root.clone()]);
    let mut ascend_stack: Vec<Vec<TreeNode>> = Vec::new();

    let mut descend_queue_levels = [1usize, 0usize];
    let mut ascend_stack_levels: Vec<usize> = vec![1];

    while let Some(nodes) = descend_queue.pop_front() {
        let mut level_changed = false;

        if descend_queue_levels[0] == 0 {
            level_changed = true;
            descend_queue_levels[0] = descend_queue_levels[1];
            descend_queue_levels[1] = 0;
            ascend_stack_levels.push(descend_queue_levels[0]);
        }

        descend_queue_levels[0] -= 1;
        let nodes = visitor.descend(&nodes, level_changed);

        if nodes.is_empty() {
            let last = ascend_stack_levels.last_mut().expect("nonempty stack");
            *last -= 1;

            if *last == 0 {
                ascend_stack_levels.pop();
            }

            continue;
        }

        ascend_stack.push(nodes.clone());

        for node in &nodes {
            let children = node.children();

            if !children.is_empty() {
                descend_queue.push_back(children.to_vec());
                descend_queue_levels[1] += 1;
            }
        }
    }

    if !visitor.bottom() {
        return;
    }

    while let Some(nodes) = ascend_stack.pop() {
        let mut level_changed = false;

        if *ascend_stack_levels.last().expect("nonempty stack") == 0 {
            level_changed = true;
            ascend_stack_levels.pop();
        }

        *ascend_stack_levels.last_mut().expect("nonempty stack") -= 1;
        visitor.ascend(&nodes, level_changed);
    }

    visitor.top_after(root);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_tree::bsr_to_tree;

    #[derive(Default)]
    struct Counter {
        visited: usize,
    }

    impl TreeVisitor for Counter {
        fn descend(&mut self, nodes: &[TreeNode], _level_changed: bool) -> Vec<TreeNode> {
            self.visited += nodes.len();
            nodes.to_vec()
        }
    }

    #[test]
    fn visits_root_and_both_terminal_children() {
        let (bsr, lexer) = crate::test_support::sequence_parse("ab");
        let tree = bsr_to_tree(&bsr, &lexer).unwrap().expect("tree produced");
        let mut counter = Counter::default();
        run_tree_visitor(&mut counter, &tree);
        assert_eq!(counter.visited, 3);
    }
}
