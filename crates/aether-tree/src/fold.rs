//! Ascend-only reduction over a BSR: each EPN folds its (already-folded)
//! left and right children into one value. Ported from `TransmuterBSRFold`.
//!
//! The `fold_queue` mirrors the original exactly: each `ascend` call pushes
//! one level's worth of (possibly absent) fold results to the front, and the
//! next `ascend` call up the tree consumes them back off, right sibling
//! first then left, since that is the order they were produced in.

use std::collections::VecDeque;

use aether_lex::Lexer;
use aether_parse::{Bsr, Epn};

use crate::bsr_visitor::BsrVisitor;

/// One reduction step. `fold_external` handles EPNs with no children (a bare
/// terminal match, or an empty production); `fold_internal` combines a
/// parent with its already-folded children.
pub trait Fold<T> {
    fn fold_internal(&mut self, bsr: &Bsr, lexer: &Lexer, epn: &Epn, left: Vec<T>, right: Vec<T>) -> Option<T>;

    fn fold_external(&mut self, bsr: &Bsr, lexer: &Lexer, epn: &Epn) -> Option<T>;
}

pub struct BsrFold<T, F> {
    pub folder: F,
    fold_queue: VecDeque<Vec<Option<T>>>,
}

impl<T, F: Fold<T>> BsrFold<T, F> {
    pub fn new(folder: F) -> Self {
        BsrFold {
            folder,
            fold_queue: VecDeque::new(),
        }
    }
}

impl<T: Clone, F: Fold<T>> BsrFold<T, F> {
    /// The folded value of the start derivation, once a pass has run.
    pub fn fold_s(&self) -> Option<T> {
        self.fold_queue.front()?.first()?.clone()
    }
}

impl<T, F: Fold<T>> BsrVisitor for BsrFold<T, F> {
    fn top_before(&mut self, _bsr: &Bsr, _lexer: &Lexer) {
        self.fold_queue = VecDeque::new();
    }

    fn ascend(&mut self, bsr: &Bsr, lexer: &Lexer, epns: &[Epn], _level_changed: bool) {
        let mut level = Vec::with_capacity(epns.len());

        for epn in epns {
            let has_left = !bsr.left_children(epn).is_empty();
            let has_right = !bsr.right_children(epn, lexer).is_empty();

            let value = if has_left || has_right {
                let right: Vec<T> = if has_right {
                    self.fold_queue.pop_back().unwrap_or_default().into_iter().flatten().collect()
                } else {
                    Vec::new()
                };
                let left: Vec<T> = if has_left {
                    self.fold_queue.pop_back().unwrap_or_default().into_iter().flatten().collect()
                } else {
                    Vec::new()
                };
                self.folder.fold_internal(bsr, lexer, epn, left, right)
            } else {
                self.folder.fold_external(bsr, lexer, epn)
            };

            level.push(value);
        }

        self.fold_queue.push_front(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsr_visitor::run_bsr_visitor;
    use aether_parse::Symbol;

    // A terminal last symbol never has a `right_children` entry (terminals
    // don't get their own EPN bucket), so its lexeme has to come straight
    // from the parent's `end_terminal` instead of a folded right child.
    struct ConcatFold;

    impl Fold<String> for ConcatFold {
        fn fold_internal(&mut self, _bsr: &Bsr, lexer: &Lexer, epn: &Epn, left: Vec<String>, right: Vec<String>) -> Option<String> {
            let mut result = left.concat();

            match epn.state.string.last() {
                Some(Symbol::Terminal(_)) => {
                    if let Some(terminal_id) = epn.state.end_terminal {
                        result.push_str(&lexer.terminal(terminal_id).value);
                    }
                }
                _ => result.push_str(&right.concat()),
            }

            Some(result)
        }

        fn fold_external(&mut self, _bsr: &Bsr, lexer: &Lexer, epn: &Epn) -> Option<String> {
            let terminal_id = epn.state.end_terminal?;
            Some(lexer.terminal(terminal_id).value.clone())
        }
    }

    #[test]
    fn concat_fold_rebuilds_the_matched_text() {
        let (bsr, lexer) = crate::test_support::sequence_parse("ab");
        let mut fold = BsrFold::new(ConcatFold);
        run_bsr_visitor(&mut fold, &bsr, &lexer);
        assert_eq!(fold.fold_s(), Some("ab".to_string()));
    }
}
