//! Copies only the EPNs actually reachable from the start derivation into a
//! fresh [`Bsr`], discarding dead alternatives the parser's memoization left
//! behind. Ported from `TransmuterBSRPruner`.

use aether_lex::Lexer;
use aether_parse::{Bsr, Epn};

use crate::bsr_visitor::BsrVisitor;

#[derive(Debug, Default)]
pub struct Pruner {
    pub new_bsr: Bsr,
}

impl Pruner {
    pub fn new() -> Self {
        Pruner::default()
    }
}

impl BsrVisitor for Pruner {
    fn top_before(&mut self, bsr: &Bsr, _lexer: &Lexer) {
        self.new_bsr = Bsr::default();
        self.new_bsr.start = bsr.start.clone();
    }

    fn descend(&mut self, _bsr: &Bsr, lexer: &Lexer, epns: &[Epn], _level_changed: bool) -> Vec<Epn> {
        for epn in epns {
            self.new_bsr.add(epn.clone(), lexer);
        }

        epns.to_vec()
    }
}
