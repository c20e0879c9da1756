//! Dense condition-name table shared by the lexical and syntactic symbol
//! table builders, so a `@name` guard mentioned in either grammar file
//! resolves to the same [`ConditionId`] everywhere, in first-seen
//! declaration order — the id space `CommonFold`'s condition enumeration
//! and `ConditionFold`'s "condition X is set" text both read back from.

use std::collections::HashMap;

use aether_core::ConditionId;

use crate::ast::{CondExpr, Pattern, Root};

#[derive(Debug, Clone, Default)]
pub struct ConditionTable {
    names: Vec<String>,
    ids: HashMap<String, ConditionId>,
}

impl ConditionTable {
    /// Scans both grammar files for every `@name` condition guard, assigning
    /// ids in the order names are first encountered (lexical file before
    /// syntactic, top to bottom within each).
    pub fn build(lexical: &Root, syntactic: &Root) -> Self {
        let mut table = ConditionTable::default();
        table.scan_root(lexical);
        table.scan_root(syntactic);
        table
    }

    fn scan_root(&mut self, root: &Root) {
        for production in root.productions() {
            if let Some(header) = production.header() {
                if let Some(expr) = header.condition().and_then(|c| c.expr()) {
                    self.scan_expr(&expr);
                }
                for specifier in header.specifiers() {
                    if let Some(expr) = specifier.condition().and_then(|c| c.expr()) {
                        self.scan_expr(&expr);
                    }
                }
            }

            if let Some(pattern) = production.body().and_then(|b| b.pattern()) {
                self.scan_pattern(&pattern);
            }
        }
    }

    fn scan_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::IdentRef(r) => {
                if let Some(expr) = r.condition().and_then(|c| c.expr()) {
                    self.scan_expr(&expr);
                }
            }
            Pattern::Selection(s) => s.alternatives().for_each(|p| self.scan_pattern(&p)),
            Pattern::OrderedSelection(s) => s.alternatives().for_each(|p| self.scan_pattern(&p)),
            Pattern::Sequence(s) => s.terms().for_each(|p| self.scan_pattern(&p)),
            Pattern::IterationGroup(g) => {
                if let Some(expr) = g.condition().and_then(|c| c.expr()) {
                    self.scan_expr(&expr);
                }
                if let Some(body) = g.body() {
                    self.scan_pattern(&body);
                }
            }
            Pattern::OptionalGroup(g) => {
                if let Some(body) = g.body() {
                    self.scan_pattern(&body);
                }
            }
            Pattern::Repeat(r) => {
                if let Some(body) = r.body() {
                    self.scan_pattern(&body);
                }
            }
            Pattern::Literal(_) | Pattern::Wildcard(_) | Pattern::Bracket(_) => {}
        }
    }

    fn scan_expr(&mut self, expr: &CondExpr) {
        match expr {
            CondExpr::Name(n) => {
                if let Some(name) = n.name() {
                    self.intern(name.text());
                }
            }
            CondExpr::Not(n) => {
                if let Some(operand) = n.operand() {
                    self.scan_expr(&operand);
                }
            }
            CondExpr::Paren(n) => {
                if let Some(inner) = n.inner() {
                    self.scan_expr(&inner);
                }
            }
            CondExpr::And(n) => n.operands().for_each(|e| self.scan_expr(&e)),
            CondExpr::Or(n) => n.operands().for_each(|e| self.scan_expr(&e)),
        }
    }

    fn intern(&mut self, name: &str) -> ConditionId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }

        let id = self.names.len() as ConditionId;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// The id for `name`, assigning one if this name was never scanned (a
    /// condition referenced only through a path [`ConditionTable::build`]
    /// doesn't walk would otherwise panic downstream instead of degrading).
    pub fn id(&mut self, name: &str) -> ConditionId {
        self.intern(name)
    }

    pub fn name(&self, id: ConditionId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Looks up an already-scanned name without interning a new one — for
    /// callers (like `aether-codegen`) that only ever read a table built
    /// once up front and should never silently grow it.
    pub fn get(&self, name: &str) -> Option<ConditionId> {
        self.ids.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConditionId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (i as ConditionId, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Dialect};

    fn root_of(src: &str, file: &str, dialect: Dialect) -> Root {
        Root::cast(parse(src, file, dialect).unwrap().syntax_node()).unwrap()
    }

    #[test]
    fn assigns_ids_in_first_seen_order() {
        let lex = root_of("A@(foo): 'x' ; B@(bar || foo): 'y' ;", "lexical.aether", Dialect::Lexical);
        let syn = root_of("S: 'x' ;", "syntactic.aether", Dialect::Syntactic);
        let table = ConditionTable::build(&lex, &syn);
        assert_eq!(table.name(0), Some("foo"));
        assert_eq!(table.name(1), Some("bar"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn same_name_reuses_one_id() {
        let lex = root_of("A@(foo): 'x' ; B(+A@(foo)): 'y' ;", "lexical.aether", Dialect::Lexical);
        let syn = root_of("S: 'x' ;", "syntactic.aether", Dialect::Syntactic);
        let table = ConditionTable::build(&lex, &syn);
        assert_eq!(table.len(), 1);
    }
}
