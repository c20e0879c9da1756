//! The breadth-first, level-aware traversal every BSR derivative (pruner,
//! disambiguator, fold, tree converter) builds on.
//!
//! Ported from `TransmuterBSRVisitor.visit()`: a `descend_queue` of sibling
//! EPN groups paired with an `ascend_stack` that replays the same groups in
//! reverse once the frontier bottoms out, plus a pair of counters on each
//! side that track how many groups remain at the current tree level so hooks
//! can tell when a level boundary was just crossed.

use std::collections::VecDeque;

use aether_lex::Lexer;
use aether_parse::{Bsr, Epn};

/// Hooks for one pass over a [`Bsr`]. Default bodies make every hook
/// optional; a visitor overrides only the ones it cares about.
pub trait BsrVisitor {
    fn top_before(&mut self, _bsr: &Bsr, _lexer: &Lexer) {}

    /// Called once per sibling group on the way down. Returning fewer (or
    /// zero) EPNs than were passed in prunes that branch: its children are
    /// never enqueued and no matching `ascend` call happens for it.
    fn descend(&mut self, _bsr: &Bsr, _lexer: &Lexer, epns: &[Epn], _level_changed: bool) -> Vec<Epn> {
        epns.to_vec()
    }

    /// Whether to proceed to the ascend phase at all. Most visitors only
    /// care about `descend` and return `true` unconditionally.
    fn bottom(&mut self, _bsr: &Bsr, _lexer: &Lexer) -> bool {
        true
    }

    fn ascend(&mut self, _bsr: &Bsr, _lexer: &Lexer, _epns: &[Epn], _level_changed: bool) {}

    fn top_after(&mut self, _bsr: &Bsr, _lexer: &Lexer) {}
}

/// Runs one `BsrVisitor` pass starting at `bsr.start`. A missing or empty
/// start derivation is a no-op: nothing to visit.
pub fn run_bsr_visitor(visitor: &mut impl BsrVisitor, bsr: &Bsr, lexer: &Lexer) {
    let Some((nonterm_id, start, end)) = bsr.start.clone() else {
        return;
    };
    let Some(root_epns) = bsr.nonterm_epns(nonterm_id, &start, &end) else {
        return;
    };
    if root_epns.is_empty() {
        return;
    }

    visitor.top_before(bsr, lexer);

    let mut descend_queue: VecDeque<Vec<Epn>> = VecDeque::new();
    descend_queue.push_back(root_epns.iter().cloned().collect());
    let mut ascend_stack: Vec<Vec<Epn>> = Vec::new();

    // descend_queue_levels[0]: groups left to dequeue at the current level.
    // descend_queue_levels[1]: groups already enqueued for the next level.
    let mut descend_queue_levels = [1usize, 0usize];
    let mut ascend_stack_levels: Vec<usize> = vec![1];

    while let Some(epns) = descend_queue.pop_front() {
        let mut level_changed = false;

        if descend_queue_levels[0] == 0 {
            level_changed = true;
            descend_queue_levels[0] = descend_queue_levels[1];
            descend_queue_levels[1] = 0;
            ascend_stack_levels.push(descend_queue_levels[0]);
        }

        descend_queue_levels[0] -= 1;
        let epns = visitor.descend(bsr, lexer, &epns, level_changed);

        if epns.is_empty() {
            let last = ascend_stack_levels.last_mut().expect("nonempty stack");
            *last -= 1;

            if *last == 0 {
                ascend_stack_levels.pop();
            }

            continue;
        }

        ascend_stack.push(epns.clone());

        for epn in &epns {
            let left = bsr.left_children(epn);
            let right = bsr.right_children(epn, lexer);

            if !left.is_empty() {
                descend_queue.push_back(left.into_iter().collect());
                descend_queue_levels[1] += 1;
            }

            if !right.is_empty() {
                descend_queue.push_back(right.into_iter().collect());
                descend_queue_levels[1] += 1;
            }
        }
    }

    if !visitor.bottom(bsr, lexer) {
        return;
    }

    while let Some(epns) = ascend_stack.pop() {
        let mut level_changed = false;

        if *ascend_stack_levels.last().expect("nonempty stack") == 0 {
            level_changed = true;
            ascend_stack_levels.pop();
        }

        *ascend_stack_levels.last_mut().expect("nonempty stack") -= 1;
        visitor.ascend(bsr, lexer, &epns, level_changed);
    }

    visitor.top_after(bsr, lexer);
}
