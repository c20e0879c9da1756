//! Generic parent-chained symbol table, ported from
//! `TransmuterSymbol`/`TransmuterSymbolTable` in
//! `examples/original_source/lib/Python/transmuter/front/semantic/symbol_table.py`.
//!
//! `aether-sem::lexical` and `aether-sem::syntactic` each instantiate this
//! with their own declaration payload (`D`): a terminal tag's specifiers and
//! NFA fragment, or a nonterminal's FIRST set and descend body. Both tables
//! are standalone (`parent` support exists for same-payload nesting, e.g. a
//! future block-scoped dialect); since the lexical and syntactic tables hold
//! different payload types they can't literally parent-chain onto each
//! other, so `aether-sem::syntactic` instead checks terminal names directly
//! against the lexical table's symbol set.

use indexmap::IndexMap;

use aether_core::Position;

/// One named symbol: the grammar-file position of its defining production
/// header, plus the caller-supplied declaration payload once analysis has
/// filled it in.
#[derive(Debug, Clone)]
pub struct Symbol<D> {
    pub definition: Option<Position>,
    pub declaration: Option<D>,
}

impl<D> Symbol<D> {
    fn new() -> Self {
        Symbol {
            definition: None,
            declaration: None,
        }
    }
}

impl<D> Default for Symbol<D> {
    fn default() -> Self {
        Symbol::new()
    }
}

/// A scope of named symbols, optionally chained to a parent scope.
///
/// `can_shadow` mirrors the Python flag: when `false`, `add_get` refuses to
/// introduce a new local symbol that would hide one already visible in an
/// ancestor scope, instead returning the ancestor's existing symbol. The
/// lexical table (no parent) never consults this; the syntactic table sets
/// it to `false` so a nonterminal can't accidentally shadow a terminal tag
/// of the same name.
#[derive(Debug)]
pub struct SymbolTable<D> {
    parent: Option<Box<SymbolTable<D>>>,
    can_shadow: bool,
    symbols: IndexMap<String, Symbol<D>>,
}

impl<D> SymbolTable<D> {
    pub fn new(can_shadow: bool) -> Self {
        SymbolTable {
            parent: None,
            can_shadow,
            symbols: IndexMap::new(),
        }
    }

    pub fn with_parent(can_shadow: bool, parent: SymbolTable<D>) -> Self {
        SymbolTable {
            parent: Some(Box::new(parent)),
            can_shadow,
            symbols: IndexMap::new(),
        }
    }

    /// Looks up `name` in this scope, then its ancestors.
    pub fn has(&self, name: &str) -> bool {
        self.symbols.contains_key(name) || self.parent.as_ref().is_some_and(|p| p.has(name))
    }

    /// Looks up `name` in this scope, then its ancestors. Panics if absent,
    /// mirroring the Python `assert self.parent` contract: callers are
    /// expected to check [`SymbolTable::has`] first.
    pub fn get(&self, name: &str) -> &Symbol<D> {
        if let Some(symbol) = self.symbols.get(name) {
            return symbol;
        }

        self.parent
            .as_ref()
            .expect("get() called for a name absent from this table and all its ancestors")
            .get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> &mut Symbol<D> {
        if self.symbols.contains_key(name) {
            return self.symbols.get_mut(name).unwrap();
        }

        self.parent
            .as_mut()
            .expect("get_mut() called for a name absent from this table and all its ancestors")
            .get_mut(name)
    }

    /// Returns the symbol named `name`, creating it in this scope if it
    /// doesn't already exist anywhere visible. If `can_shadow` is `false` and
    /// an ancestor already defines `name`, the existing ancestor symbol is
    /// returned instead of shadowing it locally.
    pub fn add_get(&mut self, name: &str) -> &Symbol<D> {
        let should_insert_locally = !self.symbols.contains_key(name)
            && (self.can_shadow || self.parent.as_ref().is_none_or(|p| !p.has(name)));

        if should_insert_locally {
            self.symbols.insert(name.to_string(), Symbol::new());
        }

        self.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol<D>)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    pub fn parent(&self) -> Option<&SymbolTable<D>> {
        self.parent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_get_creates_then_reuses_a_symbol() {
        let mut table: SymbolTable<u32> = SymbolTable::new(true);
        table.add_get("Id");
        table.get_mut("Id").declaration = Some(7);
        assert_eq!(table.get("Id").declaration, Some(7));
    }

    #[test]
    fn child_without_shadow_defers_to_parent_definition() {
        let mut parent: SymbolTable<u32> = SymbolTable::new(true);
        parent.add_get("Id");
        parent.get_mut("Id").declaration = Some(1);

        let mut child = SymbolTable::with_parent(false, parent);
        child.add_get("Id");
        assert_eq!(child.get("Id").declaration, Some(1));
        assert!(!child.symbols.contains_key("Id"));
    }

    #[test]
    fn child_with_shadow_allowed_introduces_its_own_symbol() {
        let mut parent: SymbolTable<u32> = SymbolTable::new(true);
        parent.add_get("Id");

        let mut child = SymbolTable::with_parent(true, parent);
        child.add_get("Id");
        child.get_mut("Id").declaration = Some(9);
        assert_eq!(child.get("Id").declaration, Some(9));
        assert!(child.symbols.contains_key("Id"));
    }

    #[test]
    fn has_checks_ancestors() {
        let mut parent: SymbolTable<u32> = SymbolTable::new(true);
        parent.add_get("Digit");
        let child = SymbolTable::with_parent(false, parent);
        assert!(child.has("Digit"));
        assert!(!child.has("Letter"));
    }
}
