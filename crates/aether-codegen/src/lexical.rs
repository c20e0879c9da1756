//! `LexicalFold`: iterates the lexical symbol table and emits one Python
//! tag definition per terminal — `start`/`ignore`/`positives`/`negatives`
//! hooks plus an `nfa` step, mirroring `aether_lex::tag::TagDef`'s hook
//! shape in target-language text rather than boxed Rust closures.

use std::collections::HashMap;

use aether_sem::conditions::ConditionTable;
use aether_sem::lexical::{BracketItem, IgnoreSpec, LexicalPattern, LexicalState, LexicalTable};

use crate::condition::fold_condition;
use crate::python::{escape_ident, Config};

/// Emits the full text of `lexical.py`.
pub fn emit(table: &LexicalTable, conditions: &ConditionTable, config: &Config) -> String {
    let ids: HashMap<&str, u32> = table.terminals.iter().map(|(n, _)| n).enumerate().map(|(i, n)| (n, i as u32)).collect();

    let mut out = String::new();
    out.push_str("\"\"\"Generated by aether. Do not edit by hand.\"\"\"\n\n");
    out.push_str(&format!("from {} import Condition\n", config.common_module));
    out.push_str(&format!("from {} import TagDef\n\n", config.runtime_module));
    out.push_str("TAGS = {}\n\n");

    for (name, symbol) in table.terminals.iter() {
        let id = ids[name];
        let decl = symbol.declaration.clone().unwrap_or_default();

        emit_start(&mut out, id, decl.start.as_ref(), conditions);
        emit_ignore(&mut out, id, &decl.ignore, conditions);
        emit_relation(&mut out, id, "positives", &decl.static_positives, &decl.conditional_positives, &ids, conditions);
        emit_relation(&mut out, id, "negatives", &decl.static_negatives, &decl.conditional_negatives, &ids, conditions);
        emit_nfa(&mut out, id, &decl.states);

        let states_start: u64 = decl.states_start.iter().fold(0u64, |acc, &i| acc | (1 << i));
        out.push_str(&format!(
            "TAGS[{id}] = TagDef(id={id}, name={name:?}, states_start=0b{states_start:b}, start=tag_{id}_start, ignore=tag_{id}_ignore, positives=tag_{id}_positives, negatives=tag_{id}_negatives, nfa=tag_{id}_nfa)\n\n",
        ));
    }

    out
}

fn emit_start(out: &mut String, id: u32, start: Option<&aether_core::ConditionTree>, conditions: &ConditionTable) {
    out.push_str(&format!("def tag_{id}_start(conditions):\n"));
    match start {
        Some(tree) => out.push_str(&format!("    return {}\n\n", fold_condition(tree, conditions))),
        None => out.push_str("    return True\n\n"),
    }
}

fn emit_ignore(out: &mut String, id: u32, ignore: &IgnoreSpec, conditions: &ConditionTable) {
    out.push_str(&format!("def tag_{id}_ignore(conditions):\n"));
    match ignore {
        IgnoreSpec::Never => out.push_str("    return False\n\n"),
        IgnoreSpec::Always => out.push_str("    return True\n\n"),
        IgnoreSpec::Conditional(key) => out.push_str(&format!("    return {}\n\n", fold_condition(&key.0, conditions))),
    }
}

fn emit_relation(
    out: &mut String,
    id: u32,
    hook: &str,
    statics: &[String],
    conditionals: &[(String, aether_core::ConditionTree)],
    ids: &HashMap<&str, u32>,
    conditions: &ConditionTable,
) {
    out.push_str(&format!("def tag_{id}_{hook}(conditions):\n"));
    out.push_str("    result = []\n");

    for name in statics {
        if let Some(&other) = ids.get(name.as_str()) {
            out.push_str(&format!("    result.append({other})\n"));
        }
    }

    for (name, tree) in conditionals {
        if let Some(&other) = ids.get(name.as_str()) {
            out.push_str(&format!("    if {}:\n", fold_condition(tree, conditions)));
            out.push_str(&format!("        result.append({other})\n"));
        }
    }

    out.push_str("    return result\n\n");
}

/// Emits the `nfa` step: for every live state bit, test the character
/// against that state's pattern, OR acceptance and successor bits into the
/// step's result.
fn emit_nfa(out: &mut String, id: u32, states: &[LexicalState]) {
    out.push_str(&format!("def tag_{id}_nfa(states, ch):\n"));
    out.push_str("    accept = False\n");
    out.push_str("    next_states = 0\n");

    for (i, state) in states.iter().enumerate() {
        out.push_str(&format!("    if states & (1 << {i}):\n"));
        out.push_str(&format!("        if {}:\n", emit_pattern_test(&state.pattern)));

        if state.accept {
            out.push_str("            accept = True\n");
        }

        for &next in &state.next {
            out.push_str(&format!("            next_states |= 1 << {next}\n"));
        }
    }

    out.push_str("    return accept, next_states\n\n");
}

fn emit_pattern_test(pattern: &LexicalPattern) -> String {
    match pattern {
        LexicalPattern::Simple(c) => format!("ch == {:?}", c),
        LexicalPattern::Wildcard => "True".to_string(),
        LexicalPattern::Bracket { negative, items } => {
            let checks: Vec<String> = items
                .iter()
                .map(|item| match item {
                    BracketItem::Simple(c) => format!("ch == {:?}", c),
                    BracketItem::Range(lo, hi) => format!("{:?} <= ch <= {:?}", lo, hi),
                })
                .collect();
            let joined = if checks.is_empty() { "False".to_string() } else { checks.join(" or ") };
            if *negative {
                format!("not ({joined})")
            } else {
                joined
            }
        }
    }
}

/// Python's reserved-word list a tag name could otherwise collide with;
/// delegates to [`escape_ident`] so `class`, `def`, etc. never appear bare.
pub fn safe_name(name: &str) -> String {
    escape_ident(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_char_test_compares_equality() {
        assert_eq!(emit_pattern_test(&LexicalPattern::Simple('a')), "ch == 'a'");
    }

    #[test]
    fn negative_bracket_negates_the_disjunction() {
        let pattern = LexicalPattern::Bracket {
            negative: true,
            items: vec![BracketItem::Range('a', 'z')],
        };
        assert_eq!(emit_pattern_test(&pattern), "not ('a' <= ch <= 'z')");
    }

    #[test]
    fn wildcard_always_matches() {
        assert_eq!(emit_pattern_test(&LexicalPattern::Wildcard), "True");
    }
}
