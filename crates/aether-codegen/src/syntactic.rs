//! `SyntacticFold`: emits one Python nonterminal definition per production —
//! `start`, `first`, and `descend` hooks, mirroring
//! `aether_parse::nonterm::NontermDef`'s shape in target-language text.
//!
//! Identifiers the production body references (terminal tags or other
//! nonterminals) share one id space here: tag ids keep the values
//! [`crate::lexical::emit`] assigned them, and nonterminals are numbered
//! starting right after the last tag id. `engine.call` dispatches on that
//! combined space at run time rather than keeping two separate ones, the
//! one simplification this generator makes relative to the two distinct
//! `TagId`/`NontermId` spaces the Rust engine crates use internally.

use std::collections::HashMap;

use aether_sem::ast::Root;
use aether_sem::conditions::ConditionTable;
use aether_sem::lexical::LexicalTable;
use aether_sem::syntactic::{StartSpec, SyntacticTable};

use crate::condition::fold_condition;
use crate::expression::fold_pattern;
use crate::python::Config;

/// Emits the full text of `syntactic.py`.
pub fn emit(
    root: &Root,
    table: &SyntacticTable,
    lexical: &LexicalTable,
    conditions: &ConditionTable,
    config: &Config,
) -> String {
    let terminal_count = lexical.terminals.iter().count();

    let mut ids: HashMap<&str, u32> =
        lexical.terminals.iter().map(|(n, _)| n).enumerate().map(|(i, n)| (n, i as u32)).collect();

    let nonterminal_names: Vec<&str> = table.nonterminals.iter().map(|(n, _)| n).collect();
    for (i, &name) in nonterminal_names.iter().enumerate() {
        ids.insert(name, (terminal_count + i) as u32);
    }

    let bodies: HashMap<String, _> = root
        .productions()
        .filter_map(|p| {
            let name = p.header()?.name()?.text().to_string();
            let pattern = p.body().and_then(|b| b.pattern());
            Some((name, pattern))
        })
        .collect();

    let mut out = String::new();
    out.push_str("\"\"\"Generated by aether. Do not edit by hand.\"\"\"\n\n");
    out.push_str(&format!("from {} import Condition\n", config.common_module));
    out.push_str(&format!("from {} import NontermDef\n\n", config.runtime_module));
    out.push_str("NONTERMS = {}\n\n");

    for &name in &nonterminal_names {
        let id = ids[name];
        let symbol = table.nonterminals.get(name);
        let decl = symbol.declaration.clone().unwrap_or_default();

        emit_start(&mut out, id, &decl.start, conditions);
        emit_first(&mut out, id, &decl.static_first, &decl.conditional_first, &ids, conditions);

        let pattern = bodies.get(name).cloned().flatten();
        emit_descend(&mut out, id, name, pattern.as_ref(), &ids, conditions);

        out.push_str(&format!(
            "NONTERMS[{id}] = NontermDef(id={id}, name={name:?}, start=nonterm_{id}_start, first=nonterm_{id}_first, descend=nonterm_{id}_descend)\n\n",
        ));
    }

    out
}

fn emit_start(out: &mut String, id: u32, start: &StartSpec, conditions: &ConditionTable) {
    out.push_str(&format!("def nonterm_{id}_start(conditions):\n"));
    match start {
        StartSpec::No => out.push_str("    return False\n\n"),
        StartSpec::Yes => out.push_str("    return True\n\n"),
        StartSpec::Conditional(key) => out.push_str(&format!("    return {}\n\n", fold_condition(&key.0, conditions))),
    }
}

fn emit_first(
    out: &mut String,
    id: u32,
    statics: &[String],
    conditionals: &[(String, aether_core::ConditionTree)],
    ids: &HashMap<&str, u32>,
    conditions: &ConditionTable,
) {
    out.push_str(&format!("def nonterm_{id}_first(conditions):\n"));
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

fn emit_descend(
    out: &mut String,
    id: u32,
    owner: &str,
    pattern: Option<&aether_sem::ast::Pattern>,
    ids: &HashMap<&str, u32>,
    conditions: &ConditionTable,
) {
    out.push_str(&format!("def nonterm_{id}_descend(engine, state):\n"));
    match pattern {
        Some(pattern) => {
            let expr = fold_pattern(pattern, owner, ids, conditions);
            out.push_str(&format!("    return {expr}(frozenset({{state}}))\n\n"));
        }
        None => out.push_str("    return frozenset({state})\n\n"),
    }
}
