//! Typed AST wrappers over the meta-language CST built by [`crate::parser`].
//!
//! Each struct wraps a `SyntaxNode`; casting is infallible given a node of
//! the right kind, matching `plotnik-lib::parser::ast`'s shape. `symtab`
//! builders (`aether-sem::lexical`, `aether-sem::syntactic`) walk this view
//! rather than the raw green tree.

use crate::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(Production, Production);
ast_node!(ProductionHeader, ProductionHeader);
ast_node!(ProductionBody, ProductionBody);
ast_node!(Specifiers, Specifiers);
ast_node!(PositiveSpec, PositiveSpec);
ast_node!(NegativeSpec, NegativeSpec);
ast_node!(IgnoreSpec, IgnoreSpec);
ast_node!(StartSpec, StartSpec);
ast_node!(Condition, Condition);
ast_node!(CondOr, CondOr);
ast_node!(CondAnd, CondAnd);
ast_node!(CondNot, CondNot);
ast_node!(CondParen, CondParen);
ast_node!(CondName, CondName);
ast_node!(Selection, Selection);
ast_node!(OrderedSelection, OrderedSelection);
ast_node!(Sequence, Sequence);
ast_node!(IterationGroup, IterationGroup);
ast_node!(OptionalGroup, OptionalGroup);
ast_node!(IdentRef, IdentRef);
ast_node!(Literal, Literal);
ast_node!(Wildcard, Wildcard);
ast_node!(Bracket, Bracket);
ast_node!(Repeat, Repeat);

/// A condition-tree node: `Condition` itself is just the `@` wrapper, this is
/// the boolean expression underneath it (and also what a specifier's trailing
/// guard, or a primary's `@cond` suffix, casts to directly).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CondExpr {
    Or(CondOr),
    And(CondAnd),
    Not(CondNot),
    Paren(CondParen),
    Name(CondName),
}

impl CondExpr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::CondOr => CondOr::cast(node).map(CondExpr::Or),
            SyntaxKind::CondAnd => CondAnd::cast(node).map(CondExpr::And),
            SyntaxKind::CondNot => CondNot::cast(node).map(CondExpr::Not),
            SyntaxKind::CondParen => CondParen::cast(node).map(CondExpr::Paren),
            SyntaxKind::CondName => CondName::cast(node).map(CondExpr::Name),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            CondExpr::Or(n) => n.as_cst(),
            CondExpr::And(n) => n.as_cst(),
            CondExpr::Not(n) => n.as_cst(),
            CondExpr::Paren(n) => n.as_cst(),
            CondExpr::Name(n) => n.as_cst(),
        }
    }
}

/// A specifier inside a production header's `(...)` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Specifier {
    Positive(PositiveSpec),
    Negative(NegativeSpec),
    Ignore(IgnoreSpec),
    Start(StartSpec),
}

impl Specifier {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::PositiveSpec => PositiveSpec::cast(node).map(Specifier::Positive),
            SyntaxKind::NegativeSpec => NegativeSpec::cast(node).map(Specifier::Negative),
            SyntaxKind::IgnoreSpec => IgnoreSpec::cast(node).map(Specifier::Ignore),
            SyntaxKind::StartSpec => StartSpec::cast(node).map(Specifier::Start),
            _ => None,
        }
    }

    /// The condition guard trailing this specifier, if any.
    pub fn condition(&self) -> Option<Condition> {
        let cst = match self {
            Specifier::Positive(n) => n.as_cst(),
            Specifier::Negative(n) => n.as_cst(),
            Specifier::Ignore(n) => n.as_cst(),
            Specifier::Start(n) => n.as_cst(),
        };
        cst.children().find_map(Condition::cast)
    }
}

/// A term of a sequence: either a pattern atom/group or a `Repeat` wrapping
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Selection(Selection),
    OrderedSelection(OrderedSelection),
    Sequence(Sequence),
    IterationGroup(IterationGroup),
    OptionalGroup(OptionalGroup),
    IdentRef(IdentRef),
    Literal(Literal),
    Wildcard(Wildcard),
    Bracket(Bracket),
    Repeat(Repeat),
}

impl Pattern {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Selection => Selection::cast(node).map(Pattern::Selection),
            SyntaxKind::OrderedSelection => OrderedSelection::cast(node).map(Pattern::OrderedSelection),
            SyntaxKind::Sequence => Sequence::cast(node).map(Pattern::Sequence),
            SyntaxKind::IterationGroup => IterationGroup::cast(node).map(Pattern::IterationGroup),
            SyntaxKind::OptionalGroup => OptionalGroup::cast(node).map(Pattern::OptionalGroup),
            SyntaxKind::IdentRef => IdentRef::cast(node).map(Pattern::IdentRef),
            SyntaxKind::Literal => Literal::cast(node).map(Pattern::Literal),
            SyntaxKind::Wildcard => Wildcard::cast(node).map(Pattern::Wildcard),
            SyntaxKind::Bracket => Bracket::cast(node).map(Pattern::Bracket),
            SyntaxKind::Repeat => Repeat::cast(node).map(Pattern::Repeat),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Pattern::Selection(n) => n.as_cst(),
            Pattern::OrderedSelection(n) => n.as_cst(),
            Pattern::Sequence(n) => n.as_cst(),
            Pattern::IterationGroup(n) => n.as_cst(),
            Pattern::OptionalGroup(n) => n.as_cst(),
            Pattern::IdentRef(n) => n.as_cst(),
            Pattern::Literal(n) => n.as_cst(),
            Pattern::Wildcard(n) => n.as_cst(),
            Pattern::Bracket(n) => n.as_cst(),
            Pattern::Repeat(n) => n.as_cst(),
        }
    }
}

impl Root {
    pub fn productions(&self) -> impl Iterator<Item = Production> + '_ {
        self.0.children().filter_map(Production::cast)
    }
}

impl Production {
    pub fn header(&self) -> Option<ProductionHeader> {
        self.0.children().find_map(ProductionHeader::cast)
    }

    pub fn body(&self) -> Option<ProductionBody> {
        self.0.children().find_map(ProductionBody::cast)
    }
}

impl ProductionHeader {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Id)
    }

    pub fn condition(&self) -> Option<Condition> {
        self.0.children().find_map(Condition::cast)
    }

    pub fn specifiers(&self) -> impl Iterator<Item = Specifier> + '_ {
        self.0
            .children()
            .find_map(Specifiers::cast)
            .into_iter()
            .flat_map(|s| s.as_cst().clone().children().collect::<Vec<_>>())
            .filter_map(Specifier::cast)
    }
}

impl ProductionBody {
    pub fn pattern(&self) -> Option<Pattern> {
        self.0.children().find_map(Pattern::cast)
    }
}

impl Condition {
    pub fn expr(&self) -> Option<CondExpr> {
        self.0.children().find_map(CondExpr::cast)
    }
}

impl CondOr {
    pub fn operands(&self) -> impl Iterator<Item = CondExpr> + '_ {
        self.0.children().filter_map(CondExpr::cast)
    }
}

impl CondAnd {
    pub fn operands(&self) -> impl Iterator<Item = CondExpr> + '_ {
        self.0.children().filter_map(CondExpr::cast)
    }
}

impl CondNot {
    pub fn operand(&self) -> Option<CondExpr> {
        self.0.children().find_map(CondExpr::cast)
    }
}

impl CondParen {
    pub fn inner(&self) -> Option<CondExpr> {
        self.0.children().find_map(CondExpr::cast)
    }
}

impl CondName {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Id)
    }
}

impl Selection {
    pub fn alternatives(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.0.children().filter_map(Pattern::cast)
    }
}

impl OrderedSelection {
    pub fn alternatives(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.0.children().filter_map(Pattern::cast)
    }
}

impl Sequence {
    pub fn terms(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.0.children().filter_map(Pattern::cast)
    }
}

impl IterationGroup {
    pub fn body(&self) -> Option<Pattern> {
        self.0.children().find_map(Pattern::cast)
    }

    pub fn condition(&self) -> Option<Condition> {
        self.0.children().find_map(Condition::cast)
    }
}

impl OptionalGroup {
    pub fn body(&self) -> Option<Pattern> {
        self.0.children().find_map(Pattern::cast)
    }
}

impl IdentRef {
    pub fn name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| t.kind() == SyntaxKind::Id)
    }

    pub fn condition(&self) -> Option<Condition> {
        self.0.children().find_map(Condition::cast)
    }
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.children_with_tokens().filter_map(|it| it.into_token()).next()
    }
}

impl Bracket {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.children_with_tokens().filter_map(|it| it.into_token()).next()
    }
}

impl Repeat {
    pub fn body(&self) -> Option<Pattern> {
        self.0.children().find_map(Pattern::cast)
    }

    /// The suffix operator token: `*`, `+`, `?`, or a `RepeatRange` literal
    /// like `{2,4}`.
    pub fn operator(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::Star | SyntaxKind::Plus | SyntaxKind::Question | SyntaxKind::RepeatRange
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, Dialect};

    #[test]
    fn walks_a_lexical_production_with_specifiers() {
        let root = parse("Digit(+Num): '0' | '1' ;", "lexical.aether", Dialect::Lexical)
            .unwrap()
            .syntax_node();
        let root = Root::cast(root).unwrap();
        let production = root.productions().next().unwrap();
        let header = production.header().unwrap();
        assert_eq!(header.name().unwrap().text(), "Digit");
        let specs: Vec<_> = header.specifiers().collect();
        assert_eq!(specs.len(), 1);
        assert!(matches!(specs[0], Specifier::Positive(_)));
    }

    #[test]
    fn walks_a_syntactic_group_body() {
        let root = parse("Expr: { Term } ;", "syntactic.aether", Dialect::Syntactic)
            .unwrap()
            .syntax_node();
        let root = Root::cast(root).unwrap();
        let body = root.productions().next().unwrap().body().unwrap();
        assert!(matches!(body.pattern(), Some(Pattern::IterationGroup(_))));
    }

    #[test]
    fn reads_a_condition_guard() {
        let root = parse("A@(foo || !bar): 'x' ;", "lexical.aether", Dialect::Lexical)
            .unwrap()
            .syntax_node();
        let root = Root::cast(root).unwrap();
        let header = root.productions().next().unwrap().header().unwrap();
        assert!(matches!(header.condition().unwrap().expr(), Some(CondExpr::Or(_))));
    }
}
