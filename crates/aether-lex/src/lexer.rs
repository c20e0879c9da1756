//! The parallel-NFA longest-match lexer engine (spec.md §4.1).
//!
//! Ported from the "cached" variant of the original Python front end
//! (`lib/Python/next/transmuter/front/lexical.py`'s `TransmuterLexer`), which
//! spec.md's Open Questions section marks as authoritative over the older,
//! uncached implementation.

use std::collections::{BTreeSet, HashMap, HashSet};

use aether_core::{AetherError, AetherResult, ConditionSet, Position};

use crate::tag::{LexState, TagDef, TagId};
use crate::terminal::{Terminal, TerminalId};

/// Simultaneously simulates every active tag's NFA over the input, applying
/// longest-match and tag closure at each terminal boundary.
pub struct Lexer {
    input: String,
    tags: Vec<TagDef>,

    /// Canonical "current position" the caller tracks; advanced in place the
    /// first time a terminal is produced, mirroring
    /// `TransmuterLexer.start_position`.
    pub start_position: Position,

    states_start: HashMap<TagId, LexState>,
    tags_ignore: HashSet<TagId>,
    tags_positives: HashMap<TagId, HashSet<TagId>>,
    tags_negatives: HashMap<TagId, HashSet<TagId>>,

    /// Memoized tag-closure results, keyed by the initial longest-match
    /// accept set (spec.md §4.1 "Tag closure ... Memoize the mapping").
    closure_cache: HashMap<BTreeSet<TagId>, HashSet<TagId>>,

    terminals: Vec<Terminal>,
    first: Option<TerminalId>,
}

impl Lexer {
    pub fn new(
        filename: impl Into<std::sync::Arc<str>>,
        input: &str,
        conditions: ConditionSet,
        tags: Vec<TagDef>,
    ) -> Self {
        let filename = filename.into();
        let mut states_start = HashMap::new();
        let mut tags_ignore = HashSet::new();
        let mut tags_positives = HashMap::new();
        let mut tags_negatives = HashMap::new();

        for tag in &tags {
            if (tag.start)(&conditions) {
                states_start.insert(tag.id, tag.states_start);

                if (tag.ignore)(&conditions) {
                    tags_ignore.insert(tag.id);
                }

                let positives: HashSet<TagId> = (tag.positives)(&conditions)
                    .into_iter()
                    .filter(|other| tags.iter().any(|t| t.id == *other && (t.start)(&conditions)))
                    .collect();
                tags_positives.insert(tag.id, positives);

                let negatives: HashSet<TagId> = (tag.negatives)(&conditions)
                    .into_iter()
                    .filter(|other| tags.iter().any(|t| t.id == *other && (t.start)(&conditions)))
                    .collect();
                tags_negatives.insert(tag.id, negatives);
            }
        }

        Lexer {
            start_position: Position::start(filename),
            input: input.to_string(),
            tags,
            states_start,
            tags_ignore,
            tags_positives,
            tags_negatives,
            closure_cache: HashMap::new(),
            terminals: Vec::new(),
            first: None,
        }
    }

    pub fn terminal(&self, id: TerminalId) -> &Terminal {
        &self.terminals[id]
    }

    /// `next_terminal` from spec.md §4.1: idempotent with respect to
    /// `current`, returns `None` at end of input.
    pub fn next_terminal(&mut self, current: Option<TerminalId>) -> AetherResult<Option<TerminalId>> {
        match current {
            None => {
                if self.first.is_none() {
                    let start = self.start_position.clone();
                    self.first = self.get_terminal(&start)?;

                    if let Some(id) = self.first {
                        // Canonical start position is updated in place so
                        // callers holding a reference to it observe the
                        // real first-terminal start (spec.md §3: "Mutable so
                        // that canonical 'start' positions can be updated in
                        // place").
                        let observed = self.terminals[id].start_position.clone();
                        self.start_position.update(&observed);
                    }
                }

                Ok(self.first)
            }
            Some(id) => {
                if id + 1 < self.terminals.len() {
                    return Ok(Some(id + 1));
                }

                let end = self.terminals[id].end_position.clone();
                self.get_terminal(&end)
            }
        }
    }

    /// Implements the matching loop of spec.md §4.1, steps 1-3.
    ///
    /// `Position::index` is a byte offset (matching the original's file
    /// positions), so the scan below walks `input[index..].chars()` rather
    /// than indexing directly, keeping multi-byte UTF-8 input correct.
    fn get_terminal(&mut self, start_position: &Position) -> AetherResult<Option<TerminalId>> {
        if start_position.index == self.input.len() {
            return Ok(None);
        }

        let mut start_position = start_position.clone();

        loop {
            tracing::trace!(index = start_position.index, "matching terminal");

            let mut current_position = start_position.clone();
            let mut current_states: HashMap<TagId, LexState> = self.states_start.clone();
            let mut accepted_position = start_position.clone();
            let mut accepted_tags: HashSet<TagId> = HashSet::new();
            let mut chars = self.input[start_position.index..].chars();

            while !current_states.is_empty() {
                let Some(ch) = chars.next() else { break };
                let mut next_states = HashMap::new();
                let mut next_accepts = HashSet::new();

                for (&tag_id, &state) in current_states.iter() {
                    let tag = self.tags.iter().find(|t| t.id == tag_id).expect("tag exists");
                    let (accept, next_state) = (tag.nfa)(state, ch);

                    if accept {
                        next_accepts.insert(tag_id);
                    }

                    if next_state != 0 {
                        next_states.insert(tag_id, next_state);
                    }
                }

                current_position.advance(ch);

                if !next_accepts.is_empty() {
                    accepted_tags = next_accepts;
                    accepted_position = current_position.clone();
                }

                current_states = next_states;
            }

            if accepted_tags.is_empty() {
                return Err(AetherError::NoTerminal {
                    position: start_position,
                });
            }

            let key: BTreeSet<TagId> = accepted_tags.iter().copied().collect();
            let closed = if let Some(cached) = self.closure_cache.get(&key) {
                cached.clone()
            } else {
                let mut closed = self.tag_closure(&accepted_tags);
                closed.retain(|tag| !self.tags_ignore.contains(tag));
                self.closure_cache.insert(key, closed.clone());
                closed
            };

            if !closed.is_empty() {
                let mut tags: Vec<TagId> = closed.into_iter().collect();
                tags.sort_unstable();
                let value = self.input[start_position.index..accepted_position.index].to_string();
                let id = self.terminals.len();
                tracing::debug!(id, ?tags, len = value.len(), "terminal matched");
                let terminal = Terminal {
                    tags,
                    value,
                    start_position: start_position.clone(),
                    end_position: accepted_position.clone(),
                };
                self.terminals.push(terminal);
                return Ok(Some(id));
            }

            if accepted_position.index == self.input.len() {
                return Ok(None);
            }

            // Every accepted tag was ignored: skip and restart.
            start_position = accepted_position;
        }
    }

    /// Positive/negative tag closure (spec.md §4.1 "Tag closure"):
    /// `A* = lfp(positives, A)`, `N = lfp(negatives, negatives(A*))`,
    /// result `A* \ N`.
    fn tag_closure(&self, accepted: &HashSet<TagId>) -> HashSet<TagId> {
        let mut positive_closure = accepted.clone();
        let mut frontier: Vec<TagId> = accepted.iter().copied().collect();

        while let Some(tag) = frontier.pop() {
            if let Some(positives) = self.tags_positives.get(&tag) {
                for &p in positives {
                    if positive_closure.insert(p) {
                        frontier.push(p);
                    }
                }
            }
        }

        let mut negative_closure: HashSet<TagId> = HashSet::new();
        let mut frontier: Vec<TagId> = Vec::new();

        for tag in &positive_closure {
            if let Some(negatives) = self.tags_negatives.get(tag) {
                for &n in negatives {
                    if negative_closure.insert(n) {
                        frontier.push(n);
                    }
                }
            }
        }

        while let Some(tag) = frontier.pop() {
            if let Some(negatives) = self.tags_negatives.get(&tag) {
                for &n in negatives {
                    if negative_closure.insert(n) {
                        frontier.push(n);
                    }
                }
            }
        }

        positive_closure.difference(&negative_closure).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `nfa` for a tag matching one or more ASCII letters: state 1 is the
    /// start (and only) state, accepting on every letter and looping.
    fn letters_nfa(state: LexState, ch: char) -> (bool, LexState) {
        if state & 1 != 0 && ch.is_ascii_alphabetic() {
            (true, 1)
        } else {
            (false, 0)
        }
    }

    fn digits_nfa(state: LexState, ch: char) -> (bool, LexState) {
        if state & 1 != 0 && ch.is_ascii_digit() {
            (true, 1)
        } else {
            (false, 0)
        }
    }

    #[test]
    fn single_identifier_is_one_terminal() {
        let tags = vec![TagDef::simple(0, "Id", 1, letters_nfa)];
        let mut lexer = Lexer::new("t.in", "abc", ConditionSet::empty(), tags);
        let id = lexer.next_terminal(None).unwrap().unwrap();
        let terminal = lexer.terminal(id);
        assert_eq!(terminal.value, "abc");
        assert_eq!(terminal.tags, vec![0]);
        assert_eq!(terminal.start_position.index, 0);
        assert_eq!(terminal.end_position.index, 3);
        assert!(lexer.next_terminal(Some(id)).unwrap().is_none());
    }

    #[test]
    fn longest_match_prefers_longer_prefix_and_unions_tags() {
        // Two tags that both match "ab" but one also continues to "abc".
        let short_nfa = |state: LexState, ch: char| -> (bool, LexState) {
            match (state, ch) {
                (1, 'a') => (false, 2),
                (2, 'b') => (true, 0),
                _ => (false, 0),
            }
        };
        let long_nfa = |state: LexState, ch: char| -> (bool, LexState) {
            match (state, ch) {
                (1, 'a') => (false, 2),
                (2, 'b') => (true, 4),
                (4, 'c') => (true, 0),
                _ => (false, 0),
            }
        };
        let tags = vec![
            TagDef::simple(0, "Short", 1, short_nfa),
            TagDef::simple(1, "Long", 1, long_nfa),
        ];
        let mut lexer = Lexer::new("t.in", "abc", ConditionSet::empty(), tags);
        let id = lexer.next_terminal(None).unwrap().unwrap();
        let terminal = lexer.terminal(id);
        assert_eq!(terminal.value, "abc");
        assert_eq!(terminal.tags, vec![1]);
    }

    #[test]
    fn ignored_terminal_is_skipped_and_positions_stay_contiguous() {
        let ws_nfa = |state: LexState, ch: char| -> (bool, LexState) {
            if state & 1 != 0 && ch == ' ' {
                (true, 1)
            } else {
                (false, 0)
            }
        };
        let tags = vec![
            {
                let mut tag = TagDef::simple(0, "Ws", 1, ws_nfa);
                tag.ignore = Box::new(|_| true);
                tag
            },
            TagDef::simple(1, "Id", 1, letters_nfa),
        ];
        let mut lexer = Lexer::new("t.in", "a  b", ConditionSet::empty(), tags);
        let first = lexer.next_terminal(None).unwrap().unwrap();
        assert_eq!(lexer.terminal(first).value, "a");
        let second = lexer.next_terminal(Some(first)).unwrap().unwrap();
        let t2 = lexer.terminal(second);
        assert_eq!(t2.value, "b");
        assert_eq!(t2.start_position.index, 3);
    }

    #[test]
    fn conditional_negative_suppresses_keyword_overlap() {
        // Kw: "start" {- Id}; Id: [A-Za-z]+;  — on input "start", only Kw
        // should survive once negatives are applied.
        let kw_nfa = |state: LexState, ch: char| -> (bool, LexState) {
            const WORD: &[char] = &['s', 't', 'a', 'r', 't'];
            let pos = state.trailing_zeros() as usize;

            if pos < WORD.len() && ch == WORD[pos] {
                let next = 1 << (pos + 1);
                (pos + 1 == WORD.len(), next)
            } else {
                (false, 0)
            }
        };
        let mut kw = TagDef::simple(0, "Kw", 1, kw_nfa);
        kw.negatives = Box::new(|_| vec![1]);
        let id_tag = TagDef::simple(1, "Id", 1, letters_nfa);
        let mut lexer = Lexer::new("t.in", "start", ConditionSet::empty(), vec![kw, id_tag]);
        let id = lexer.next_terminal(None).unwrap().unwrap();
        assert_eq!(lexer.terminal(id).tags, vec![0]);
    }

    #[test]
    fn closure_is_idempotent() {
        let mut a = TagDef::simple(0, "A", 1, letters_nfa);
        a.positives = Box::new(|_| vec![1]);
        let b = TagDef::simple(1, "B", 1, letters_nfa);
        let lexer = Lexer::new("t.in", "x", ConditionSet::empty(), vec![a, b]);
        let once = lexer.tag_closure(&HashSet::from([0]));
        let twice = lexer.tag_closure(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_match_raises_no_terminal() {
        let tags = vec![TagDef::simple(0, "Digits", 1, digits_nfa)];
        let mut lexer = Lexer::new("t.in", "abc", ConditionSet::empty(), tags);
        let err = lexer.next_terminal(None).unwrap_err();
        assert!(matches!(err, AetherError::NoTerminal { .. }));
    }
}
