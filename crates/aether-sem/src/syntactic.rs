//! Syntactic symbol table: reads `syntactic.aether`'s AST, resolves every
//! identifier reference against the lexical table's terminal names (so a
//! reference can be either a nonterminal or a terminal tag), and computes
//! each nonterminal's FIRST set.
//!
//! `SymbolTable<D>` is monomorphic per declaration payload, so the
//! nonterminal table can't literally parent-chain onto `LexicalTable`'s
//! `SymbolTable<LexicalSymbol>` the way the original's single
//! `TransmuterSymbol`-typed table does; `terminal_names` plays the parent
//! table's role instead, and a production name colliding with an existing
//! terminal tag is rejected outright rather than silently aliased.
//!
//! Ported from `SyntacticSymbol`/`SyntacticSymbolTableBuilder`/`_SyntacticFold`
//! in `examples/original_source/src/next/transmuter/front/aether/semantic.py`.

use std::collections::{HashMap, HashSet};

use aether_core::{compute_sccs, AetherError, AetherResult, ConditionTree, Position};

use crate::ast::{self, CondExpr, Pattern as AstPattern, Root};
use crate::lexical::LexicalTable;
use crate::symtab::SymbolTable;

/// One nonterminal's declared facts: whether it's a start symbol (and under
/// what condition), and its FIRST set, split into names that always apply
/// and names that only apply under a recorded condition.
#[derive(Debug, Clone, Default)]
pub struct SyntacticSymbol {
    pub definition: Option<Position>,
    pub start: StartSpec,
    pub static_first: Vec<String>,
    pub conditional_first: Vec<(String, ConditionTree)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StartSpec {
    #[default]
    No,
    Yes,
    Conditional(crate::lexical::ConditionTreeKey),
}

pub struct SyntacticTable {
    pub nonterminals: SymbolTable<SyntacticSymbol>,
}

/// Builds the syntactic symbol table. `lexical` supplies the terminal names
/// a nonterminal's identifier references are allowed to resolve to when
/// they aren't themselves other nonterminals.
pub fn build(
    root: &Root,
    lexical: &LexicalTable,
    conditions: &mut crate::conditions::ConditionTable,
    source: &str,
    file: &str,
) -> AetherResult<SyntacticTable> {
    let terminal_names: HashSet<String> = lexical.terminals.iter().map(|(n, _)| n.to_string()).collect();
    let mut nonterminals: SymbolTable<SyntacticSymbol> = SymbolTable::new(false);

    for production in root.productions() {
        let header = production
            .header()
            .expect("parser guarantees every Production has a header");
        let name = header.name().expect("parser guarantees header has a name").text().to_string();
        let position = position_of(&production, source, file);

        if terminal_names.contains(&name) {
            return Err(AetherError::DuplicateSymbolDefinition { position, name });
        }

        let symbol = nonterminals.add_get(&name);
        if symbol.declaration.as_ref().is_some_and(|d| d.definition.is_some()) {
            return Err(AetherError::DuplicateSymbolDefinition { position, name });
        }

        let mut decl = symbol.declaration.clone().unwrap_or_default();
        decl.definition = Some(position);
        nonterminals.get_mut(&name).declaration = Some(decl);

        record_references(&mut nonterminals, production.body(), &terminal_names);
    }

    let names: Vec<String> = nonterminals.iter().map(|(n, _)| n.to_string()).collect();
    for name in &names {
        if terminal_names.contains(name) {
            continue;
        }

        let symbol = nonterminals.get(name);
        if symbol.declaration.as_ref().and_then(|d| d.definition).is_none() {
            let mut position = Position::start(file);
            for ch in source.chars() {
                position.advance(ch);
            }
            return Err(AetherError::UndefinedSymbol { position, name: name.clone() });
        }
    }

    for production in root.productions() {
        let header = production.header().unwrap();
        let name = header.name().unwrap().text().to_string();
        process_start(&mut nonterminals, &header, &name, conditions);
        process_first(&mut nonterminals, &production, &name, conditions);
    }

    reduce_first_to_sccs(&mut nonterminals, &names);

    Ok(SyntacticTable { nonterminals })
}

fn position_of(production: &ast::Production, source: &str, file: &str) -> Position {
    let offset: usize = production.as_cst().text_range().start().into();
    let mut pos = Position::start(file);
    for ch in source[..offset].chars() {
        pos.advance(ch);
    }
    pos
}

/// Walks a production body recording every identifier reference so that,
/// once every production has been seen, undefined names can be reported.
/// Terminal names need no local symbol (they live in the lexical table);
/// only genuinely unresolved names become placeholder nonterminal symbols
/// awaiting a definition that may never come.
fn record_references(
    nonterminals: &mut SymbolTable<SyntacticSymbol>,
    body: Option<ast::ProductionBody>,
    terminal_names: &HashSet<String>,
) {
    let Some(body) = body else { return };
    let Some(pattern) = body.pattern() else { return };
    walk_references(nonterminals, &pattern, terminal_names);
}

fn walk_references(
    nonterminals: &mut SymbolTable<SyntacticSymbol>,
    pattern: &AstPattern,
    terminal_names: &HashSet<String>,
) {
    match pattern {
        AstPattern::IdentRef(r) => {
            if let Some(name) = r.name().map(|t| t.text().to_string()) {
                if !terminal_names.contains(&name) {
                    nonterminals.add_get(&name);
                }
            }
        }
        AstPattern::Selection(s) => {
            for alt in s.alternatives() {
                walk_references(nonterminals, &alt, terminal_names);
            }
        }
        AstPattern::OrderedSelection(s) => {
            for alt in s.alternatives() {
                walk_references(nonterminals, &alt, terminal_names);
            }
        }
        AstPattern::Sequence(s) => {
            for term in s.terms() {
                walk_references(nonterminals, &term, terminal_names);
            }
        }
        AstPattern::IterationGroup(g) => {
            if let Some(body) = g.body() {
                walk_references(nonterminals, &body, terminal_names);
            }
        }
        AstPattern::OptionalGroup(g) => {
            if let Some(body) = g.body() {
                walk_references(nonterminals, &body, terminal_names);
            }
        }
        AstPattern::Repeat(r) => {
            if let Some(body) = r.body() {
                walk_references(nonterminals, &body, terminal_names);
            }
        }
        AstPattern::Literal(_) | AstPattern::Wildcard(_) | AstPattern::Bracket(_) => {}
    }
}

fn process_start(
    nonterminals: &mut SymbolTable<SyntacticSymbol>,
    header: &ast::ProductionHeader,
    name: &str,
    conditions: &mut crate::conditions::ConditionTable,
) {
    let mut start = StartSpec::No;

    for specifier in header.specifiers() {
        if let ast::Specifier::Start(_) = &specifier {
            start = match specifier.condition().and_then(|c| c.expr()) {
                Some(expr) => {
                    StartSpec::Conditional(crate::lexical::ConditionTreeKey(to_condition_tree(&expr, conditions)))
                }
                None => StartSpec::Yes,
            };
        }
    }

    nonterminals
        .get_mut(name)
        .declaration
        .get_or_insert_with(Default::default)
        .start = start;
}

fn to_condition_tree(expr: &CondExpr, conditions: &mut crate::conditions::ConditionTable) -> ConditionTree {
    match expr {
        CondExpr::Name(n) => {
            let name = n.name().map(|t| t.text().to_string()).unwrap_or_default();
            ConditionTree::Id(conditions.id(&name))
        }
        CondExpr::Not(n) => ConditionTree::Not(Box::new(
            n.operand()
                .map(|e| to_condition_tree(&e, conditions))
                .unwrap_or(ConditionTree::And(vec![])),
        )),
        CondExpr::Paren(n) => n
            .inner()
            .map(|e| to_condition_tree(&e, conditions))
            .unwrap_or(ConditionTree::And(vec![])),
        CondExpr::And(n) => ConditionTree::And(n.operands().map(|e| to_condition_tree(&e, conditions)).collect()),
        CondExpr::Or(n) => ConditionTree::Or(n.operands().map(|e| to_condition_tree(&e, conditions)).collect()),
    }
}

/// A reference collected while folding one production's body: the
/// identifier name, and the condition guards (if any) that apply to each
/// occurrence — matching `_SyntacticFragment.references`'s
/// `dict[name, list[Condition]]` shape, where an empty list means
/// unconditional.
#[derive(Debug, Clone, Default)]
struct FirstFragment {
    references: HashMap<String, Vec<ConditionTree>>,
    bypass: bool,
}

/// Folds one nonterminal's production body into its raw FIRST contribution.
/// Ported from `_SyntacticFold`: identifier leaves contribute a reference;
/// a `Condition` trailing a reference is recorded as a guard on it; optional
/// and iteration groups mark bypass; selection unions; sequence only
/// propagates past a nullable (bypassing) prefix.
fn fold_first(pattern: &AstPattern, conditions: &mut crate::conditions::ConditionTable) -> FirstFragment {
    match pattern {
        AstPattern::IdentRef(r) => {
            let mut references = HashMap::new();
            if let Some(name) = r.name().map(|t| t.text().to_string()) {
                let guard = r.condition().and_then(|c| c.expr()).map(|e| to_condition_tree(&e, conditions));
                references.insert(name, guard.into_iter().collect());
            }
            FirstFragment { references, bypass: false }
        }
        AstPattern::Literal(_) | AstPattern::Wildcard(_) | AstPattern::Bracket(_) => FirstFragment::default(),
        AstPattern::Selection(s) => fold_selection(s.alternatives(), conditions),
        AstPattern::OrderedSelection(s) => fold_selection(s.alternatives(), conditions),
        AstPattern::Sequence(s) => fold_sequence(s.terms(), conditions),
        AstPattern::IterationGroup(g) => {
            let mut frag = g.body().map(|b| fold_first(&b, conditions)).unwrap_or_default();
            frag.bypass = true;
            frag
        }
        AstPattern::OptionalGroup(g) => {
            let mut frag = g.body().map(|b| fold_first(&b, conditions)).unwrap_or_default();
            frag.bypass = true;
            frag
        }
        AstPattern::Repeat(r) => r.body().map(|b| fold_first(&b, conditions)).unwrap_or_default(),
    }
}

fn fold_selection(
    alternatives: impl Iterator<Item = AstPattern>,
    conditions: &mut crate::conditions::ConditionTable,
) -> FirstFragment {
    let mut merged: Option<FirstFragment> = None;

    for alt in alternatives {
        let frag = fold_first(&alt, conditions);
        merged = Some(match merged {
            None => frag,
            Some(mut acc) => {
                for (name, guards) in frag.references {
                    acc.references.entry(name).or_default().extend(guards);
                }
                acc.bypass = acc.bypass || frag.bypass;
                acc
            }
        });
    }

    merged.unwrap_or_default()
}

fn fold_sequence(
    terms: impl Iterator<Item = AstPattern>,
    conditions: &mut crate::conditions::ConditionTable,
) -> FirstFragment {
    let folded: Vec<FirstFragment> = terms.map(|t| fold_first(&t, conditions)).collect();
    let mut terms = folded.into_iter();
    let Some(mut acc) = terms.next() else {
        return FirstFragment::default();
    };

    for next in terms {
        if !acc.bypass {
            break;
        }

        for (name, guards) in next.references {
            acc.references.entry(name).or_default().extend(guards);
        }
        acc.bypass = acc.bypass && next.bypass;
    }

    acc
}

/// Folds one production's FIRST contribution into its symbol. References to
/// terminal tags are recorded too at this point; they're dropped below in
/// [`reduce_first_to_sccs`], whose job is exactly to keep a name only when
/// it's a nonterminal in the same strongly-connected component.
fn process_first(
    nonterminals: &mut SymbolTable<SyntacticSymbol>,
    production: &ast::Production,
    name: &str,
    conditions: &mut crate::conditions::ConditionTable,
) {
    let fragment = production.body().and_then(|b| b.pattern()).map(|p| fold_first(&p, conditions));

    let decl = nonterminals.get_mut(name).declaration.get_or_insert_with(Default::default);

    let Some(fragment) = fragment else { return };

    for (reference, guards) in fragment.references {
        if guards.is_empty() {
            decl.static_first.push(reference);
        } else if guards.len() == 1 {
            decl.conditional_first.push((reference, guards.into_iter().next().unwrap()));
        } else {
            decl.conditional_first.push((reference, ConditionTree::Or(guards)));
        }
    }
}

/// Reduces every nonterminal's FIRST set to its strongly-connected
/// component in the FIRST graph (nonterminal names only — terminal
/// references never participate in left-recursion and are left untouched).
/// Matches `SyntacticSymbolTableBuilder.bottom`'s SCC post-pass: this is
/// exactly the ascend-parent set the parser engine's left-recursion
/// handling needs (spec.md §4.2).
fn reduce_first_to_sccs(nonterminals: &mut SymbolTable<SyntacticSymbol>, names: &[String]) {
    let name_set: HashSet<String> = names.iter().cloned().collect();
    let mut graph: HashMap<String, HashSet<String>> = HashMap::new();

    for name in names {
        let decl = nonterminals.get(name).declaration.clone().unwrap_or_default();
        let mut edges: HashSet<String> = decl.static_first.into_iter().filter(|f| name_set.contains(f)).collect();
        edges.extend(decl.conditional_first.into_iter().map(|(f, _)| f).filter(|f| name_set.contains(f)));
        graph.insert(name.clone(), edges);
    }

    let sccs = compute_sccs(&graph);
    let mut reduced: HashMap<String, HashSet<String>> = HashMap::new();

    for scc in sccs {
        let is_self_loop_singleton = scc.len() == 1
            && graph.get(scc.iter().next().unwrap()).is_some_and(|e| e.contains(scc.iter().next().unwrap()));

        if scc.len() == 1 && !is_self_loop_singleton {
            continue;
        }

        for v in &scc {
            let allowed: HashSet<String> = graph.get(v).cloned().unwrap_or_default().intersection(&scc).cloned().collect();
            reduced.insert(v.clone(), allowed);
        }
    }

    for name in names {
        let decl = nonterminals.get_mut(name).declaration.get_or_insert_with(Default::default);

        let Some(allowed) = reduced.get(name) else {
            decl.static_first.clear();
            decl.conditional_first.clear();
            continue;
        };

        decl.static_first.retain(|f| allowed.contains(f));
        decl.conditional_first.retain(|(f, _)| allowed.contains(f));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Dialect};

    fn build_from(lex_src: &str, syn_src: &str) -> SyntacticTable {
        let mut conditions = crate::conditions::ConditionTable::default();

        let lex_node = parse(lex_src, "lexical.aether", Dialect::Lexical).unwrap().syntax_node();
        let lex_root = Root::cast(lex_node).unwrap();
        let lexical = crate::lexical::build(&lex_root, &mut conditions, lex_src, "lexical.aether").unwrap();

        let syn_node = parse(syn_src, "syntactic.aether", Dialect::Syntactic).unwrap().syntax_node();
        let syn_root = Root::cast(syn_node).unwrap();
        build(&syn_root, &lexical, &mut conditions, syn_src, "syntactic.aether").unwrap()
    }

    #[test]
    fn non_recursive_first_is_reduced_to_empty() {
        // "Expr" never appears in its own FIRST position here (it's the
        // second symbol, guarded by a non-nullable "Digit"), so the
        // strongly-connected-component reduction drops both the terminal
        // reference and the whole entry: this FIRST set exists only to
        // drive the parser's left-recursion bootstrapping, not general
        // prediction.
        let table = build_from("Digit: '0' | '1' ;", "Expr: Digit Expr | Digit ;");
        let symbol = table.nonterminals.get("Expr");
        let decl = symbol.declaration.as_ref().unwrap();
        assert!(decl.static_first.is_empty());
    }

    #[test]
    fn left_recursive_first_keeps_self_reference() {
        let table = build_from("Digit: '0' ;", "Expr: Expr Digit | Digit ;");
        let symbol = table.nonterminals.get("Expr");
        let decl = symbol.declaration.as_ref().unwrap();
        assert!(decl.static_first.contains(&"Expr".to_string()));
    }

    #[test]
    fn mutual_left_recursion_keeps_both_names() {
        let table = build_from("Digit: '0' ;", "A: B Digit | Digit ; B: A Digit | Digit ;");
        let a = table.nonterminals.get("A").declaration.as_ref().unwrap();
        let b = table.nonterminals.get("B").declaration.as_ref().unwrap();
        assert!(a.static_first.contains(&"B".to_string()));
        assert!(b.static_first.contains(&"A".to_string()));
    }

    #[test]
    fn undefined_nonterminal_reference_is_rejected() {
        let mut conditions = crate::conditions::ConditionTable::default();
        let lex_node = parse("Digit: '0' ;", "lexical.aether", Dialect::Lexical).unwrap().syntax_node();
        let lexical =
            crate::lexical::build(&Root::cast(lex_node).unwrap(), &mut conditions, "Digit: '0' ;", "lexical.aether")
                .unwrap();

        let syn_src = "Expr: Digit Missing ;";
        let syn_node = parse(syn_src, "syntactic.aether", Dialect::Syntactic).unwrap().syntax_node();
        let err =
            build(&Root::cast(syn_node).unwrap(), &lexical, &mut conditions, syn_src, "syntactic.aether").unwrap_err();
        assert!(matches!(err, AetherError::UndefinedSymbol { .. }));
    }

    #[test]
    fn start_specifier_is_recorded() {
        let table = build_from("Digit: '0' ;", "Expr(start): Digit ;");
        let symbol = table.nonterminals.get("Expr");
        assert_eq!(symbol.declaration.as_ref().unwrap().start, StartSpec::Yes);
    }

    #[test]
    fn multi_production_grammar_resolves_every_reference() {
        let syn_src = indoc::indoc! {"
            Expr(start): Term Plus Expr | Term ;
            Term: Digit ;
        "};
        let table = build_from("Digit: '0' | '1' ; Plus: '+' ;", syn_src);
        assert!(table.nonterminals.has("Expr"));
        assert!(table.nonterminals.has("Term"));
        assert_eq!(table.nonterminals.get("Expr").declaration.as_ref().unwrap().start, StartSpec::Yes);
    }
}
