//! The memoized recursive-descent-with-ascent parser engine, grounded on
//! `TransmuterParser` (spec.md §4.2).

use std::collections::{HashMap, HashSet};

use aether_core::{compute_sccs, AetherError, AetherResult, ConditionSet, Position};
use aether_lex::{Lexer, TerminalId};

use crate::bsr::{Bsr, Epn};
use crate::nonterm::{NontermDef, NontermId};
use crate::state::ParsingState;
use crate::symbol::Symbol;

/// Internal control-flow signal distinguishing an ordinary failed parse
/// alternative (`TransmuterInternalError`, always caught locally) from a
/// real diagnostic that must propagate out of `parse()`.
#[derive(Debug)]
pub enum Backtrack {
    NoMatch,
    Fatal(AetherError),
}

impl From<AetherError> for Backtrack {
    fn from(err: AetherError) -> Self {
        Backtrack::Fatal(err)
    }
}

type CallResult = Result<HashSet<ParsingState>, Backtrack>;

/// How `Parser::call` should decide whether to ascend after a successful
/// descent, mirroring the Python `ascend: type[NonterminalType] | bool |
/// None` parameter.
#[derive(Debug, Clone, Copy)]
pub enum Ascend {
    /// `ascend=None`: the top-level call from `parse()`.
    Unspecified,
    /// `ascend=<the calling nonterminal's type>`: generated `descend` bodies
    /// pass this so the engine can skip a redundant ascend when the callee
    /// is already reachable directly through the caller's FIRST set.
    Caller(NontermId),
    /// `ascend=<bool>`: already resolved, used when `ascend()` re-enters
    /// `call` for an ascend-parent.
    Forced(bool),
}

fn conditions_position() -> Position {
    Position {
        file: "<conditions>".into(),
        index: 0,
        line: 0,
        column: 0,
    }
}

pub struct Parser {
    pub lexer: Lexer,
    pub bsr: Bsr,
    nonterminals: Vec<NontermDef>,
    nonterminal_start: NontermId,
    nonterminals_first: HashMap<NontermId, HashSet<NontermId>>,
    ascend_parents: HashMap<NontermId, Vec<NontermId>>,
    eoi: Option<TerminalId>,
    memo: HashMap<(NontermId, Position), HashSet<TerminalId>>,
}

impl Parser {
    /// Builds the engine for one run: picks the start symbol, computes FIRST
    /// sets, and reduces left-recursive SCCs exactly as
    /// `TransmuterParser.__post_init__` does.
    pub fn new(lexer: Lexer, nonterminals: Vec<NontermDef>, conditions: ConditionSet) -> AetherResult<Self> {
        let mut start_candidate: Option<NontermId> = None;
        let mut first_sets: HashMap<NontermId, HashSet<NontermId>> = HashMap::new();

        for n in &nonterminals {
            if (n.start)(&conditions) {
                if start_candidate.is_some() {
                    return Err(AetherError::MultipleStarts {
                        position: conditions_position(),
                    });
                }

                start_candidate = Some(n.id);
            }

            first_sets.insert(n.id, (n.first)(&conditions).into_iter().collect());
        }

        let Some(nonterminal_start) = start_candidate else {
            return Err(AetherError::NoStart {
                position: conditions_position(),
            });
        };

        let graph: HashMap<NontermId, HashSet<NontermId>> = first_sets
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        let sccs = compute_sccs(&graph);

        let mut nonterminals_first = HashMap::new();
        let mut ascend_parents: HashMap<NontermId, Vec<NontermId>> = HashMap::new();

        for scc in sccs {
            if scc.len() == 1 {
                let v = *scc.iter().next().expect("non-empty scc");

                // Singleton SCC that isn't left-recursive: leave unreduced.
                if !first_sets[&v].contains(&v) {
                    continue;
                }
            }

            for &v in &scc {
                let restricted: HashSet<NontermId> = scc.intersection(&first_sets[&v]).copied().collect();
                nonterminals_first.insert(v, restricted);

                let parents: Vec<NontermId> = scc
                    .iter()
                    .copied()
                    .filter(|&w| first_sets[&w].contains(&v))
                    .collect();
                ascend_parents.insert(v, parents);
            }
        }

        Ok(Parser {
            lexer,
            bsr: Bsr::default(),
            nonterminals,
            nonterminal_start,
            nonterminals_first,
            ascend_parents,
            eoi: None,
            memo: HashMap::new(),
        })
    }

    /// Runs the parse. On success, `self.bsr.start` identifies the root EPN
    /// key a caller can hand to `aether-tree` for disambiguation/conversion.
    pub fn parse(&mut self) -> AetherResult<()> {
        let initial_state = ParsingState {
            string: Vec::new(),
            start_position: self.lexer.start_position.clone(),
            split_position: self.lexer.start_position.clone(),
            end_terminal: None,
        };

        match self.call(
            Symbol::Nonterminal(self.nonterminal_start),
            HashSet::from([initial_state]),
            Ascend::Unspecified,
        ) {
            Ok(_) => {}
            Err(Backtrack::NoMatch) => {}
            Err(Backtrack::Fatal(err)) => return Err(err),
        }

        // Input was empty, or only ever matched ignored terminals.
        let Some(eoi) = self.eoi else { return Ok(()) };

        let eoi_end = self.lexer.terminal(eoi).end_position.clone();

        if !self
            .bsr
            .contains_nonterm(self.nonterminal_start, &self.lexer.start_position, &eoi_end)
        {
            return Err(AetherError::NoDerivation {
                position: self.lexer.terminal(eoi).start_position.clone(),
            });
        }

        if let Some(next) = self.lexer.next_terminal(Some(eoi))? {
            return Err(AetherError::NoDerivation {
                position: self.lexer.terminal(next).start_position.clone(),
            });
        }

        self.bsr.start = Some((self.nonterminal_start, self.lexer.start_position.clone(), eoi_end));

        Ok(())
    }

    /// Matches `symbol` from every state in `current_states`, unioning the
    /// results. Fails (`Backtrack::NoMatch`) only if every state failed.
    pub fn call(&mut self, symbol: Symbol, current_states: HashSet<ParsingState>, ascend: Ascend) -> CallResult {
        tracing::trace!(?symbol, states = current_states.len(), "call");

        let mut next_states = HashSet::new();

        match symbol {
            Symbol::Terminal(tag_id) => {
                for current_state in current_states {
                    if let Some(next_state) = self.call_single_terminal_tag(tag_id, current_state)? {
                        next_states.insert(next_state);
                    }
                }
            }
            Symbol::Nonterminal(nonterm_id) => {
                let ascend_bool = self.resolve_ascend(nonterm_id, ascend);

                for current_state in current_states {
                    let results = self.call_single_nonterminal_type(nonterm_id, current_state, ascend_bool)?;
                    next_states.extend(results);
                }
            }
        }

        if next_states.is_empty() {
            return Err(Backtrack::NoMatch);
        }

        Ok(next_states)
    }

    /// Determines at runtime whether a nonterminal call should ascend,
    /// preventing infinite recursion when caller and callee share an SCC.
    fn resolve_ascend(&self, nonterm_id: NontermId, ascend: Ascend) -> bool {
        match ascend {
            Ascend::Forced(b) => b,
            Ascend::Unspecified => self.nonterminals_first.contains_key(&nonterm_id),
            Ascend::Caller(caller) => {
                (!self.nonterminals_first.contains_key(&caller)
                    || !self.nonterminals_first[&caller].contains(&nonterm_id))
                    && self.nonterminals_first.contains_key(&nonterm_id)
            }
        }
    }

    fn call_single_terminal_tag(
        &mut self,
        tag_id: aether_lex::TagId,
        current_state: ParsingState,
    ) -> Result<Option<ParsingState>, Backtrack> {
        self.bsr.add(
            Epn {
                type_: None,
                state: current_state.clone(),
            },
            &self.lexer,
        );

        let next_terminal = self.lexer.next_terminal(current_state.end_terminal)?;

        if let Some(next_id) = next_terminal {
            let next_start = self.lexer.terminal(next_id).start_position.clone();
            let should_replace = match self.eoi {
                None => true,
                Some(eoi_id) => self.lexer.terminal(eoi_id).start_position.index < next_start.index,
            };

            if should_replace {
                self.eoi = Some(next_id);
            }
        }

        let Some(next_id) = next_terminal else {
            return Ok(None);
        };

        if !self.lexer.terminal(next_id).has_tag(tag_id) {
            return Ok(None);
        }

        let split_position = match current_state.end_terminal {
            Some(prev) => self.lexer.terminal(prev).end_position.clone(),
            None => current_state.split_position.clone(),
        };

        let mut string = current_state.string;
        string.push(Symbol::Terminal(tag_id));

        Ok(Some(ParsingState {
            string,
            start_position: current_state.start_position,
            split_position,
            end_terminal: Some(next_id),
        }))
    }

    fn call_single_nonterminal_type(
        &mut self,
        nonterm_id: NontermId,
        current_state: ParsingState,
        ascend: bool,
    ) -> CallResult {
        self.bsr.add(
            Epn {
                type_: None,
                state: current_state.clone(),
            },
            &self.lexer,
        );

        let current_state_end_position = match current_state.end_terminal {
            Some(id) => self.lexer.terminal(id).end_position.clone(),
            None => current_state.split_position.clone(),
        };

        let memo_key = (nonterm_id, current_state_end_position.clone());

        if ascend || !self.memo.contains_key(&memo_key) {
            let initial_len = self.memo.entry(memo_key.clone()).or_default().len();

            let descend = self
                .nonterminals
                .iter()
                .find(|n| n.id == nonterm_id)
                .expect("nonterminal exists")
                .descend
                .clone();

            let descend_state = ParsingState {
                string: Vec::new(),
                start_position: current_state_end_position.clone(),
                split_position: current_state_end_position.clone(),
                end_terminal: current_state.end_terminal,
            };

            match descend(self, descend_state) {
                Ok(next_states) => {
                    for next_state in next_states {
                        let end_terminal = next_state
                            .end_terminal
                            .expect("a completed descend always ends in a terminal");

                        self.bsr.add(
                            Epn {
                                type_: Some(nonterm_id),
                                state: next_state,
                            },
                            &self.lexer,
                        );
                        self.memo.get_mut(&memo_key).expect("memo key inserted above").insert(end_terminal);
                    }

                    let grew = self.memo[&memo_key].len() != initial_len;

                    if ascend && grew {
                        self.ascend(nonterm_id, &current_state)?;
                    }
                }
                Err(Backtrack::NoMatch) => {}
                Err(fatal @ Backtrack::Fatal(_)) => return Err(fatal),
            }
        }

        let result = self.memo[&memo_key]
            .iter()
            .map(|&end_terminal| {
                let mut string = current_state.string.clone();
                string.push(Symbol::Nonterminal(nonterm_id));

                ParsingState {
                    string,
                    start_position: current_state.start_position.clone(),
                    split_position: current_state_end_position.clone(),
                    end_terminal: Some(end_terminal),
                }
            })
            .collect();

        Ok(result)
    }

    /// Propagates a successful descent of `nonterm_id` up to every
    /// nonterminal in the same left-recursive SCC whose FIRST set contains
    /// it, retrying their own descent at the unchanged end position.
    fn ascend(&mut self, nonterm_id: NontermId, current_state: &ParsingState) -> Result<(), Backtrack> {
        let current_states = HashSet::from([current_state.clone()]);
        let parents = self.ascend_parents.get(&nonterm_id).cloned().unwrap_or_default();

        for parent in parents {
            match self.call(Symbol::Nonterminal(parent), current_states.clone(), Ascend::Forced(true)) {
                Ok(_) => {}
                Err(Backtrack::NoMatch) => {}
                Err(fatal @ Backtrack::Fatal(_)) => return Err(fatal),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use aether_lex::{LexState, TagDef};

    const SEQ_A: aether_lex::TagId = 0;
    const SEQ_B: aether_lex::TagId = 1;
    const SEQ_S: NontermId = 0;

    fn single_char_nfa(expect: char) -> impl Fn(LexState, char) -> (bool, LexState) {
        move |state, ch| if state == 1 && ch == expect { (true, 0) } else { (false, 0) }
    }

    fn seq_grammar(input: &str) -> Parser {
        let tags = vec![
            TagDef::simple(SEQ_A, "A", 1, single_char_nfa('a')),
            TagDef::simple(SEQ_B, "B", 1, single_char_nfa('b')),
        ];
        let lexer = Lexer::new("t.aether", input, ConditionSet::empty(), tags);

        let descend: Rc<dyn Fn(&mut Parser, ParsingState) -> CallResult> = Rc::new(|parser, state| {
            let after_a = parser.call(Symbol::Terminal(SEQ_A), HashSet::from([state]), Ascend::Unspecified)?;
            parser.call(Symbol::Terminal(SEQ_B), after_a, Ascend::Unspecified)
        });

        let nonterminals = vec![NontermDef {
            id: SEQ_S,
            name: "S".to_string(),
            start: Box::new(|_| true),
            first: Box::new(|_| Vec::new()),
            descend,
        }];

        Parser::new(lexer, nonterminals, ConditionSet::empty()).unwrap()
    }

    #[test]
    fn sequence_grammar_accepts_matching_input() {
        let mut parser = seq_grammar("ab");
        parser.parse().unwrap();
        let (id, start, end) = parser.bsr.start.clone().expect("derivation recorded");
        assert_eq!(id, SEQ_S);
        assert_eq!(start.index, 0);
        assert_eq!(end.index, 2);
    }

    #[test]
    fn sequence_grammar_rejects_trailing_garbage() {
        let mut parser = seq_grammar("abc");
        let err = parser.parse().unwrap_err();
        assert!(matches!(err, AetherError::NoDerivation { .. }));
    }

    #[test]
    fn sequence_grammar_rejects_incomplete_input() {
        let mut parser = seq_grammar("a");
        let err = parser.parse().unwrap_err();
        assert!(matches!(err, AetherError::NoDerivation { .. }));
    }

    const SUM_DIGIT: aether_lex::TagId = 0;
    const SUM_PLUS: aether_lex::TagId = 1;
    const SUM_E: NontermId = 0;

    fn digit_nfa(state: LexState, ch: char) -> (bool, LexState) {
        if state == 1 && ch.is_ascii_digit() {
            (true, 0)
        } else {
            (false, 0)
        }
    }

    fn left_recursive_sum_grammar(input: &str) -> Parser {
        let tags = vec![
            TagDef::simple(SUM_DIGIT, "Digit", 1, digit_nfa),
            TagDef::simple(SUM_PLUS, "Plus", 1, single_char_nfa('+')),
        ];
        let lexer = Lexer::new("t.aether", input, ConditionSet::empty(), tags);

        // E := E '+' Digit | Digit, both alternatives attempted and unioned
        // so an ambiguous grammar built the same way would keep every
        // derivation rather than committing to the first match.
        let descend: Rc<dyn Fn(&mut Parser, ParsingState) -> CallResult> = Rc::new(|parser, state| {
            let mut results = HashSet::new();

            let recursive_alt = (|| -> CallResult {
                let s1 = parser.call(
                    Symbol::Nonterminal(SUM_E),
                    HashSet::from([state.clone()]),
                    Ascend::Caller(SUM_E),
                )?;
                let s2 = parser.call(Symbol::Terminal(SUM_PLUS), s1, Ascend::Unspecified)?;
                parser.call(Symbol::Terminal(SUM_DIGIT), s2, Ascend::Unspecified)
            })();

            match recursive_alt {
                Ok(states) => results.extend(states),
                Err(Backtrack::NoMatch) => {}
                Err(fatal) => return Err(fatal),
            }

            match parser.call(Symbol::Terminal(SUM_DIGIT), HashSet::from([state]), Ascend::Unspecified) {
                Ok(states) => results.extend(states),
                Err(Backtrack::NoMatch) => {}
                Err(fatal) => return Err(fatal),
            }

            if results.is_empty() {
                Err(Backtrack::NoMatch)
            } else {
                Ok(results)
            }
        });

        let nonterminals = vec![NontermDef {
            id: SUM_E,
            name: "E".to_string(),
            start: Box::new(|_| true),
            // Left-recursive: E appears in its own FIRST set.
            first: Box::new(|_| vec![SUM_E]),
            descend,
        }];

        Parser::new(lexer, nonterminals, ConditionSet::empty()).unwrap()
    }

    #[test]
    fn left_recursive_grammar_parses_single_digit() {
        let mut parser = left_recursive_sum_grammar("7");
        parser.parse().unwrap();
        assert!(parser.bsr.start.is_some());
    }

    #[test]
    fn left_recursive_grammar_parses_chained_sums() {
        let mut parser = left_recursive_sum_grammar("1+2+3");
        parser.parse().unwrap();
        let (id, start, end) = parser.bsr.start.clone().expect("derivation recorded");
        assert_eq!(id, SUM_E);
        assert_eq!(start.index, 0);
        assert_eq!(end.index, 5);
    }

    const AMB_D: aether_lex::TagId = 0;
    const AMB_S: NontermId = 0;
    const AMB_DX: NontermId = 1;

    fn ambiguous_grammar(input: &str) -> Parser {
        let tags = vec![TagDef::simple(AMB_D, "D", 1, single_char_nfa('d'))];
        let lexer = Lexer::new("t.aether", input, ConditionSet::empty(), tags);

        let dx_descend: Rc<dyn Fn(&mut Parser, ParsingState) -> CallResult> = Rc::new(|parser, state| {
            let after_first = parser.call(Symbol::Terminal(AMB_D), HashSet::from([state]), Ascend::Unspecified)?;
            parser.call(Symbol::Terminal(AMB_D), after_first, Ascend::Unspecified)
        });

        // S := D D | Dx, and Dx := D D: both alternatives span the same two
        // characters, so the completed-S bucket in the BSR packs two EPNs.
        let s_descend: Rc<dyn Fn(&mut Parser, ParsingState) -> CallResult> = Rc::new(|parser, state| {
            let mut results = HashSet::new();

            let direct = (|| -> CallResult {
                let after_first = parser.call(Symbol::Terminal(AMB_D), HashSet::from([state.clone()]), Ascend::Unspecified)?;
                parser.call(Symbol::Terminal(AMB_D), after_first, Ascend::Unspecified)
            })();

            match direct {
                Ok(states) => results.extend(states),
                Err(Backtrack::NoMatch) => {}
                Err(fatal) => return Err(fatal),
            }

            match parser.call(Symbol::Nonterminal(AMB_DX), HashSet::from([state]), Ascend::Unspecified) {
                Ok(states) => results.extend(states),
                Err(Backtrack::NoMatch) => {}
                Err(fatal) => return Err(fatal),
            }

            if results.is_empty() {
                Err(Backtrack::NoMatch)
            } else {
                Ok(results)
            }
        });

        let nonterminals = vec![
            NontermDef {
                id: AMB_S,
                name: "S".to_string(),
                start: Box::new(|_| true),
                first: Box::new(|_| Vec::new()),
                descend: s_descend,
            },
            NontermDef {
                id: AMB_DX,
                name: "Dx".to_string(),
                start: Box::new(|_| false),
                first: Box::new(|_| Vec::new()),
                descend: dx_descend,
            },
        ];

        Parser::new(lexer, nonterminals, ConditionSet::empty()).unwrap()
    }

    #[test]
    fn ambiguous_grammar_packs_both_derivations_in_one_bsr_bucket() {
        let mut parser = ambiguous_grammar("dd");
        parser.parse().unwrap();
        let (id, start, end) = parser.bsr.start.clone().expect("derivation recorded");
        let epns = parser.bsr.nonterm_epns(id, &start, &end).expect("bucket exists");
        assert_eq!(epns.len(), 2);
    }
}
