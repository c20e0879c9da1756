//! Recursive-descent parser for the grammar meta-language, building a rowan
//! green tree. Grounded on `examples/original_source/src/transmuter/front/aether/syntactic.py`,
//! whose production set (`Grammar`, `Production`, `ProductionHeader`,
//! `ProductionBody`, `Condition`, `SelectionExpression`, `SequenceExpression`,
//! ...) is this parser's exact shape, translated from a BSR-table `descend`
//! method per nonterminal into one recursive function per nonterminal.
//!
//! Unlike `aether-parse`'s BSR engine (exact-or-fail, ambiguity-tolerant),
//! this parser is LL(1)-with-backtracking over an unambiguous, hand-designed
//! meta-grammar: a syntax error here is fatal and reported once, matching
//! `plotnik-compiler`'s green-tree-builder shape but with `AetherError`
//! in place of a `Diagnostics` sink.

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

use aether_core::{AetherError, AetherResult, Position};

use crate::cst::{SyntaxKind, SyntaxNode};
use crate::lexer::{lex, token_text, Token};

/// Which of the two grammar files is being read. Several productions
/// (`ProductionSpecifier`, `SequenceExpression`, `PrimaryExpression`,
/// `IterationExpression`) branch on this exactly as the original's
/// `Conditions.lexical`/`Conditions.syntactic` checks do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Lexical,
    Syntactic,
}

pub struct ParseOutput {
    pub green: GreenNode,
}

impl ParseOutput {
    pub fn syntax_node(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }
}

pub fn parse(source: &str, file: &str, dialect: Dialect) -> AetherResult<ParseOutput> {
    let tokens = lex(source, dialect);
    let mut parser = Parser {
        source,
        file,
        dialect,
        tokens,
        pos: 0,
        builder: GreenNodeBuilder::new(),
    };
    parser.parse_root()?;
    Ok(ParseOutput {
        green: parser.builder.finish(),
    })
}

struct Parser<'s> {
    source: &'s str,
    file: &'s str,
    dialect: Dialect,
    tokens: Vec<Token>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
}

impl<'s> Parser<'s> {
    fn current(&self) -> SyntaxKind {
        self.tokens.get(self.pos).map_or(SyntaxKind::Error, |t| t.kind)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn position_at(&self, byte_offset: usize) -> Position {
        let mut pos = Position::start(self.file);
        for ch in self.source[..byte_offset].chars() {
            pos.advance(ch);
        }
        pos
    }

    fn current_position(&self) -> Position {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| usize::from(t.span.start()));
        self.position_at(offset)
    }

    fn error(&self, description: impl Into<String>) -> AetherError {
        AetherError::MetaSyntax {
            position: self.current_position(),
            description: description.into(),
        }
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.builder.checkpoint()
    }

    fn bump(&mut self) {
        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(token.kind.into(), text);
        self.pos += 1;
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) -> AetherResult<()> {
        if self.at(kind) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    // Grammar := Production+
    fn parse_root(&mut self) -> AetherResult<()> {
        self.start_node(SyntaxKind::Root);

        if self.at_eof() {
            return Err(self.error("expected at least one production"));
        }

        while !self.at_eof() {
            self.parse_production()?;
        }

        self.finish_node();
        Ok(())
    }

    // Production := ProductionHeader ProductionBody
    fn parse_production(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_production_header()?;
        self.parse_production_body()?;
        self.start_node_at(checkpoint, SyntaxKind::Production);
        self.finish_node();
        Ok(())
    }

    // ProductionHeader := Id Condition? ProductionSpecifiers? ':'
    fn parse_production_header(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.expect(SyntaxKind::Id, "an identifier")?;

        if self.dialect == Dialect::Lexical && self.at(SyntaxKind::At) {
            self.parse_condition()?;
        }

        if self.at(SyntaxKind::ParenOpen) {
            self.parse_production_specifiers()?;
        }

        self.expect(SyntaxKind::Colon, "':'")?;
        self.start_node_at(checkpoint, SyntaxKind::ProductionHeader);
        self.finish_node();
        Ok(())
    }

    // ProductionBody := SelectionExpression ';'
    fn parse_production_body(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_selection_expression()?;
        self.expect(SyntaxKind::Semi, "';'")?;
        self.start_node_at(checkpoint, SyntaxKind::ProductionBody);
        self.finish_node();
        Ok(())
    }

    // Condition := '@' DisjunctionCondition
    fn parse_condition(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.expect(SyntaxKind::At, "'@'")?;
        self.parse_disjunction_condition()?;
        self.start_node_at(checkpoint, SyntaxKind::Condition);
        self.finish_node();
        Ok(())
    }

    // ProductionSpecifiers := '(' ProductionSpecifier (',' ProductionSpecifier)* ')'
    fn parse_production_specifiers(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.expect(SyntaxKind::ParenOpen, "'('")?;
        self.parse_production_specifier()?;

        while self.eat(SyntaxKind::Comma) {
            self.parse_production_specifier()?;
        }

        self.expect(SyntaxKind::ParenClose, "')'")?;
        self.start_node_at(checkpoint, SyntaxKind::Specifiers);
        self.finish_node();
        Ok(())
    }

    // ProductionSpecifier := (('+' | '-') Id | 'ignore' | 'start') Condition?
    fn parse_production_specifier(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();

        let kind = match self.dialect {
            Dialect::Lexical => {
                if self.at(SyntaxKind::Plus) || self.at(SyntaxKind::Minus) {
                    let positive = self.at(SyntaxKind::Plus);
                    self.bump();
                    self.expect(SyntaxKind::Id, "an identifier")?;
                    if positive {
                        SyntaxKind::PositiveSpec
                    } else {
                        SyntaxKind::NegativeSpec
                    }
                } else if self.eat(SyntaxKind::KwIgnore) {
                    SyntaxKind::IgnoreSpec
                } else {
                    return Err(self.error("expected a specifier ('+name', '-name', or 'ignore')"));
                }
            }
            Dialect::Syntactic => {
                self.expect(SyntaxKind::KwStart, "'start'")?;
                SyntaxKind::StartSpec
            }
        };

        if self.at(SyntaxKind::At) {
            self.parse_condition()?;
        }

        self.start_node_at(checkpoint, kind);
        self.finish_node();
        Ok(())
    }

    // SelectionExpression := SequenceExpression (('|' | '/') SequenceExpression)*
    // A run of plain '|' yields an unordered Selection; any '/' in the run
    // yields an OrderedSelection (syntactic-only).
    fn parse_selection_expression(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_sequence_expression()?;
        let mut ordered = false;
        let mut had_alternative = false;

        loop {
            if self.eat(SyntaxKind::Pipe) {
                had_alternative = true;
            } else if self.dialect == Dialect::Syntactic && self.eat(SyntaxKind::Slash) {
                ordered = true;
                had_alternative = true;
            } else {
                break;
            }

            self.parse_sequence_expression()?;
        }

        if had_alternative {
            let kind = if ordered {
                SyntaxKind::OrderedSelection
            } else {
                SyntaxKind::Selection
            };
            self.start_node_at(checkpoint, kind);
            self.finish_node();
        }

        Ok(())
    }

    // DisjunctionCondition := ConjunctionCondition ('||' ConjunctionCondition)*
    fn parse_disjunction_condition(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_conjunction_condition()?;
        let mut any = false;

        while self.eat(SyntaxKind::PipePipe) {
            any = true;
            self.parse_conjunction_condition()?;
        }

        if any {
            self.start_node_at(checkpoint, SyntaxKind::CondOr);
            self.finish_node();
        }

        Ok(())
    }

    // ConjunctionCondition := NegationCondition ('&&' NegationCondition)*
    fn parse_conjunction_condition(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_negation_condition()?;
        let mut any = false;

        while self.eat(SyntaxKind::AmpAmp) {
            any = true;
            self.parse_negation_condition()?;
        }

        if any {
            self.start_node_at(checkpoint, SyntaxKind::CondAnd);
            self.finish_node();
        }

        Ok(())
    }

    // NegationCondition := '!'* PrimitiveCondition
    fn parse_negation_condition(&mut self) -> AetherResult<()> {
        let mut bangs = 0;
        let checkpoint = self.checkpoint();

        while self.eat(SyntaxKind::Bang) {
            bangs += 1;
        }

        self.parse_primitive_condition()?;

        for _ in 0..bangs {
            self.start_node_at(checkpoint, SyntaxKind::CondNot);
            self.finish_node();
        }

        Ok(())
    }

    // PrimitiveCondition := Id | '(' DisjunctionCondition ')'
    fn parse_primitive_condition(&mut self) -> AetherResult<()> {
        if self.at(SyntaxKind::Id) {
            let checkpoint = self.checkpoint();
            self.bump();
            self.start_node_at(checkpoint, SyntaxKind::CondName);
            self.finish_node();
            Ok(())
        } else if self.at(SyntaxKind::ParenOpen) {
            let checkpoint = self.checkpoint();
            self.bump();
            self.parse_disjunction_condition()?;
            self.expect(SyntaxKind::ParenClose, "')'")?;
            self.start_node_at(checkpoint, SyntaxKind::CondParen);
            self.finish_node();
            Ok(())
        } else {
            Err(self.error("expected a condition name or '('"))
        }
    }

    // SequenceExpression := (IterationExpression | PrimaryExpression)+
    fn parse_sequence_expression(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        let mut count = 0;

        loop {
            match self.dialect {
                Dialect::Lexical => {
                    if !self.at_primary_start() {
                        break;
                    }
                    self.parse_iteration_expression()?;
                }
                Dialect::Syntactic => {
                    if !self.at_primary_start() {
                        break;
                    }
                    self.parse_primary_expression()?;
                }
            }
            count += 1;
        }

        if count == 0 {
            return Err(self.error("expected at least one term"));
        }

        if count > 1 {
            self.start_node_at(checkpoint, SyntaxKind::Sequence);
            self.finish_node();
        }

        Ok(())
    }

    fn at_primary_start(&self) -> bool {
        match self.dialect {
            Dialect::Lexical => matches!(
                self.current(),
                SyntaxKind::OrdChar
                    | SyntaxKind::QuotedChar
                    | SyntaxKind::Dot
                    | SyntaxKind::BracketExpr
                    | SyntaxKind::ParenOpen
            ),
            Dialect::Syntactic => matches!(
                self.current(),
                SyntaxKind::Id
                    | SyntaxKind::ParenOpen
                    | SyntaxKind::BracketOpen
                    | SyntaxKind::BracketOpenOrdered
                    | SyntaxKind::BraceOpen
                    | SyntaxKind::BraceOpenOrdered
            ),
        }
    }

    // IterationExpression (lexical) := PrimaryExpression ('*' | '+' | '?' | RepeatRange)?
    fn parse_iteration_expression(&mut self) -> AetherResult<()> {
        let checkpoint = self.checkpoint();
        self.parse_primary_expression()?;

        let has_suffix = matches!(
            self.current(),
            SyntaxKind::Star | SyntaxKind::Plus | SyntaxKind::Question | SyntaxKind::RepeatRange
        );

        if has_suffix {
            self.bump();
            self.start_node_at(checkpoint, SyntaxKind::Repeat);
            self.finish_node();
        }

        Ok(())
    }

    // PrimaryExpression, branched by dialect. Syntactic adds identifier
    // references with trailing conditions, parenthesized groups, and the
    // `{ }`/`[ ]` iteration/optional groups (each with a `/`-ordered variant).
    fn parse_primary_expression(&mut self) -> AetherResult<()> {
        match self.current() {
            SyntaxKind::OrdChar | SyntaxKind::QuotedChar => {
                let checkpoint = self.checkpoint();
                self.bump();
                self.start_node_at(checkpoint, SyntaxKind::Literal);
                self.finish_node();
                Ok(())
            }
            SyntaxKind::Dot => {
                let checkpoint = self.checkpoint();
                self.bump();
                self.start_node_at(checkpoint, SyntaxKind::Wildcard);
                self.finish_node();
                Ok(())
            }
            SyntaxKind::BracketExpr => {
                let checkpoint = self.checkpoint();
                self.bump();
                self.start_node_at(checkpoint, SyntaxKind::Bracket);
                self.finish_node();
                Ok(())
            }
            SyntaxKind::Id if self.dialect == Dialect::Syntactic => {
                let checkpoint = self.checkpoint();
                self.bump();
                if self.at(SyntaxKind::At) {
                    self.parse_condition()?;
                }
                self.start_node_at(checkpoint, SyntaxKind::IdentRef);
                self.finish_node();
                Ok(())
            }
            SyntaxKind::ParenOpen => {
                self.bump();
                self.parse_selection_expression()?;
                self.expect(SyntaxKind::ParenClose, "')'")?;
                if self.dialect == Dialect::Syntactic && self.at(SyntaxKind::At) {
                    self.parse_condition()?;
                }
                Ok(())
            }
            SyntaxKind::BraceOpen | SyntaxKind::BraceOpenOrdered
                if self.dialect == Dialect::Syntactic =>
            {
                let checkpoint = self.checkpoint();
                self.bump();
                self.parse_selection_expression()?;
                self.expect(SyntaxKind::BraceClose, "'}'")?;
                if self.at(SyntaxKind::At) {
                    self.parse_condition()?;
                }
                self.start_node_at(checkpoint, SyntaxKind::IterationGroup);
                self.finish_node();
                Ok(())
            }
            SyntaxKind::BracketOpen | SyntaxKind::BracketOpenOrdered
                if self.dialect == Dialect::Syntactic =>
            {
                let checkpoint = self.checkpoint();
                self.bump();
                self.parse_selection_expression()?;
                self.expect(SyntaxKind::BracketClose, "']'")?;
                self.start_node_at(checkpoint, SyntaxKind::OptionalGroup);
                self.finish_node();
                Ok(())
            }
            _ => Err(self.error("expected a term")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_lexical(src: &str) -> SyntaxNode {
        parse(src, "lexical.aether", Dialect::Lexical)
            .unwrap()
            .syntax_node()
    }

    fn parse_syntactic(src: &str) -> SyntaxNode {
        parse(src, "syntactic.aether", Dialect::Syntactic)
            .unwrap()
            .syntax_node()
    }

    #[test]
    fn parses_a_minimal_lexical_production() {
        let root = parse_lexical("Digit: '0' | '1' ;");
        assert_eq!(root.kind(), SyntaxKind::Root);
        assert_eq!(root.children().count(), 1);
    }

    #[test]
    fn parses_specifiers_and_condition_guard() {
        let root = parse_lexical("Name(+Foo, ignore): OrdChar+ ;");
        let production = root.first_child().unwrap();
        assert!(production
            .children()
            .any(|n| n.kind() == SyntaxKind::Specifiers));
    }

    #[test]
    fn parses_syntactic_groups_and_ordered_selection() {
        let root = parse_syntactic("Expr: { Term } / [ Term ] ;");
        assert_eq!(root.kind(), SyntaxKind::Root);
        let body = root
            .first_child()
            .unwrap()
            .children()
            .find(|n| n.kind() == SyntaxKind::ProductionBody)
            .unwrap();
        assert!(body
            .descendants()
            .any(|n| n.kind() == SyntaxKind::IterationGroup));
        assert!(body
            .descendants()
            .any(|n| n.kind() == SyntaxKind::OptionalGroup));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse("Digit: '0' ; )", "lexical.aether", Dialect::Lexical).unwrap_err();
        assert!(matches!(err, AetherError::MetaSyntax { .. }));
    }
}
