//! Collapses every ambiguous span (a span packing more than one EPN) down to
//! a single choice, producing a BSR that denotes exactly one parse tree.
//! Ported from `TransmuterBSRDisambiguator`.
//!
//! The default policy matches the original: an ambiguous span is a grammar
//! defect, not something to silently resolve, so it raises
//! [`AetherError::AmbiguousGrammar`] at the first packed EPN's start
//! position. Callers that want a different tie-break (leftmost derivation,
//! longest match, a precedence table) supply their own policy via
//! [`Disambiguator::with_policy`].

use aether_core::{AetherError, AetherResult};
use aether_lex::Lexer;
use aether_parse::{Bsr, Epn};

use crate::bsr_visitor::BsrVisitor;

type Policy = Box<dyn FnMut(&[Epn]) -> AetherResult<Epn>>;

fn default_policy(epns: &[Epn]) -> AetherResult<Epn> {
    Err(AetherError::AmbiguousGrammar {
        position: epns[0].state.start_position.clone(),
    })
}

pub struct Disambiguator {
    pub new_bsr: Bsr,
    policy: Policy,
    error: Option<AetherError>,
}

impl Default for Disambiguator {
    fn default() -> Self {
        Disambiguator {
            new_bsr: Bsr::default(),
            policy: Box::new(default_policy),
            error: None,
        }
    }
}

impl Disambiguator {
    pub fn new() -> Self {
        Disambiguator::default()
    }

    pub fn with_policy(policy: impl FnMut(&[Epn]) -> AetherResult<Epn> + 'static) -> Self {
        Disambiguator {
            new_bsr: Bsr::default(),
            policy: Box::new(policy),
            error: None,
        }
    }

    /// Consumes the visitor after a pass, surfacing whatever the policy
    /// raised (if anything) as a single `Result`.
    pub fn into_result(self) -> AetherResult<Bsr> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.new_bsr),
        }
    }
}

impl BsrVisitor for Disambiguator {
    fn top_before(&mut self, bsr: &Bsr, _lexer: &Lexer) {
        self.new_bsr = Bsr::default();
        self.new_bsr.start = bsr.start.clone();
    }

    fn descend(&mut self, _bsr: &Bsr, lexer: &Lexer, epns: &[Epn], _level_changed: bool) -> Vec<Epn> {
        if self.error.is_some() {
            return Vec::new();
        }

        let chosen = if epns.len() > 1 {
            match (self.policy)(epns) {
                Ok(epn) => epn,
                Err(err) => {
                    self.error = Some(err);
                    return Vec::new();
                }
            }
        } else {
            epns[0].clone()
        };

        self.new_bsr.add(chosen.clone(), lexer);
        vec![chosen]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsr_visitor::run_bsr_visitor;

    #[test]
    fn default_policy_rejects_genuine_ambiguity() {
        // Grounded on aether-parse's `ambiguous_grammar` fixture: S := D D |
        // Dx, where "dd" packs two distinct EPNs under the start span.
        let (bsr, lexer) = crate::test_support::ambiguous_parse("dd");
        let mut disambiguator = Disambiguator::new();
        run_bsr_visitor(&mut disambiguator, &bsr, &lexer);
        assert!(matches!(
            disambiguator.into_result(),
            Err(AetherError::AmbiguousGrammar { .. })
        ));
    }

    #[test]
    fn custom_policy_picks_deterministically() {
        let (bsr, lexer) = crate::test_support::ambiguous_parse("dd");
        let mut disambiguator = Disambiguator::with_policy(|epns| Ok(epns[0].clone()));
        run_bsr_visitor(&mut disambiguator, &bsr, &lexer);
        let new_bsr = disambiguator.into_result().expect("policy always picks one");
        let (id, start, end) = new_bsr.start.clone().expect("start set");
        let epns = new_bsr
            .nonterm_epns(id, &start, &end)
            .expect("start span present");
        assert_eq!(epns.len(), 1);
    }
}
