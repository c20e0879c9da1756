//! Tiny hand-built grammars shared by this crate's tests, mirroring the
//! fixtures in `aether-parse`'s own test module (not reusable directly since
//! those live behind `#[cfg(test)]` in another crate).

use std::collections::HashSet;
use std::rc::Rc;

use aether_core::ConditionSet;
use aether_lex::{LexState, Lexer, TagDef, TagId};
use aether_parse::{Ascend, Backtrack, Bsr, NontermDef, NontermId, Parser, ParsingState, Symbol};

type CallResult = Result<HashSet<ParsingState>, Backtrack>;

fn single_char_nfa(expect: char) -> impl Fn(LexState, char) -> (bool, LexState) {
    move |state, ch| if state == 1 && ch == expect { (true, 0) } else { (false, 0) }
}

const AMB_D: TagId = 0;
const AMB_S: NontermId = 0;
const AMB_DX: NontermId = 1;

/// `S := D D | Dx`, `Dx := D D`: both alternatives span the same input, so
/// the completed-`S` bucket packs two EPNs for any two-`d` input.
pub fn ambiguous_parse(input: &str) -> (Bsr, Lexer) {
    let tags = vec![TagDef::simple(AMB_D, "D", 1, single_char_nfa('d'))];
    let lexer = Lexer::new("t.aether", input, ConditionSet::empty(), tags);

    let dx_descend: Rc<dyn Fn(&mut Parser, ParsingState) -> CallResult> = Rc::new(|parser, state| {
        let after_first = parser.call(Symbol::Terminal(AMB_D), HashSet::from([state]), Ascend::Unspecified)?;
        parser.call(Symbol::Terminal(AMB_D), after_first, Ascend::Unspecified)
    });

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

    let mut parser = Parser::new(lexer, nonterminals, ConditionSet::empty()).expect("fixture is well-formed");
    parser.parse().expect("fixture input parses");
    (parser.bsr, parser.lexer)
}

const SEQ_A: TagId = 0;
const SEQ_B: TagId = 1;
const SEQ_S: NontermId = 0;

/// `S := 'a' 'b'`: a single, unambiguous derivation.
pub fn sequence_parse(input: &str) -> (Bsr, Lexer) {
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

    let mut parser = Parser::new(lexer, nonterminals, ConditionSet::empty()).expect("fixture is well-formed");
    parser.parse().expect("fixture input parses");
    (parser.bsr, parser.lexer)
}
