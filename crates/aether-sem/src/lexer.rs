//! Lexer for the grammar meta-language (`lexical.aether` / `syntactic.aether`).
//!
//! Produces span-based tokens; text is sliced from source lazily via
//! [`token_text`]. Mirrors `plotnik-lib`'s lexer shape (coalesce consecutive
//! Logos errors into a single `Error` token instead of one per byte), but
//! dispatches to one of two dialect-specific Logos enums rather than a
//! single shared one — see [`crate::cst`]'s module doc for why a single
//! enum can't cleanly tell `[ Term ]` (syntactic optional group) apart from
//! `[a-z]` (lexical bracket expression).

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

use crate::cst::SyntaxKind;
use crate::parser::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

/// Tokens valid in `lexical.aether`: pattern atoms (raw chars, quoted
/// escapes, `.`, bracket expressions, repeat ranges) plus the specifier and
/// condition-guard punctuation shared with the syntactic dialect.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[\t\r\n ]+")]
enum LexToken {
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("@")]
    At,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("?")]
    Question,
    #[token("ignore")]
    KwIgnore,
    #[regex(r"\{[0-9]+(,[0-9]*)?\}")]
    RepeatRange,
    #[token(".")]
    Dot,
    #[regex(r#"'(?:[^'\\]|\\.)'"#)]
    QuotedChar,
    #[regex(r"\[\^?(?:[^\]\\]|\\.)*\]")]
    BracketExpr,
    #[regex(r"[A-Za-z_][0-9A-Za-z_]*", priority = 3)]
    Id,
    /// Any character not already claimed by a more specific rule above;
    /// lowest priority so identifiers and punctuation always win ties.
    #[regex(r".", priority = 1)]
    OrdChar,
}

impl From<LexToken> for SyntaxKind {
    fn from(tok: LexToken) -> Self {
        match tok {
            LexToken::Colon => SyntaxKind::Colon,
            LexToken::Semi => SyntaxKind::Semi,
            LexToken::At => SyntaxKind::At,
            LexToken::ParenOpen => SyntaxKind::ParenOpen,
            LexToken::ParenClose => SyntaxKind::ParenClose,
            LexToken::Pipe => SyntaxKind::Pipe,
            LexToken::Comma => SyntaxKind::Comma,
            LexToken::AmpAmp => SyntaxKind::AmpAmp,
            LexToken::PipePipe => SyntaxKind::PipePipe,
            LexToken::Bang => SyntaxKind::Bang,
            LexToken::Plus => SyntaxKind::Plus,
            LexToken::Minus => SyntaxKind::Minus,
            LexToken::Star => SyntaxKind::Star,
            LexToken::Question => SyntaxKind::Question,
            LexToken::KwIgnore => SyntaxKind::KwIgnore,
            LexToken::RepeatRange => SyntaxKind::RepeatRange,
            LexToken::Dot => SyntaxKind::Dot,
            LexToken::QuotedChar => SyntaxKind::QuotedChar,
            LexToken::BracketExpr => SyntaxKind::BracketExpr,
            LexToken::Id => SyntaxKind::Id,
            LexToken::OrdChar => SyntaxKind::OrdChar,
        }
    }
}

/// Tokens valid in `syntactic.aether`: production references, ordered vs.
/// unordered selection, and the brace/bracket group delimiters, plus the
/// punctuation shared with the lexical dialect. No raw pattern atoms here —
/// a syntactic rule body only ever composes other named productions.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[\t\r\n ]+")]
enum SynToken {
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("@")]
    At,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("|")]
    Pipe,
    #[token(",")]
    Comma,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("start")]
    KwStart,
    #[token("/")]
    Slash,
    #[token("{/")]
    BraceOpenOrdered,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[/")]
    BracketOpenOrdered,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[regex(r"[A-Za-z_][0-9A-Za-z_]*")]
    Id,
}

impl From<SynToken> for SyntaxKind {
    fn from(tok: SynToken) -> Self {
        match tok {
            SynToken::Colon => SyntaxKind::Colon,
            SynToken::Semi => SyntaxKind::Semi,
            SynToken::At => SyntaxKind::At,
            SynToken::ParenOpen => SyntaxKind::ParenOpen,
            SynToken::ParenClose => SyntaxKind::ParenClose,
            SynToken::Pipe => SyntaxKind::Pipe,
            SynToken::Comma => SyntaxKind::Comma,
            SynToken::AmpAmp => SyntaxKind::AmpAmp,
            SynToken::PipePipe => SyntaxKind::PipePipe,
            SynToken::Bang => SyntaxKind::Bang,
            SynToken::KwStart => SyntaxKind::KwStart,
            SynToken::Slash => SyntaxKind::Slash,
            SynToken::BraceOpenOrdered => SyntaxKind::BraceOpenOrdered,
            SynToken::BraceOpen => SyntaxKind::BraceOpen,
            SynToken::BraceClose => SyntaxKind::BraceClose,
            SynToken::BracketOpenOrdered => SyntaxKind::BracketOpenOrdered,
            SynToken::BracketOpen => SyntaxKind::BracketOpen,
            SynToken::BracketClose => SyntaxKind::BracketClose,
            SynToken::Id => SyntaxKind::Id,
        }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

pub fn lex(source: &str, dialect: Dialect) -> Vec<Token> {
    match dialect {
        Dialect::Lexical => lex_dialect::<LexToken>(source),
        Dialect::Syntactic => lex_dialect::<SynToken>(source),
    }
}

fn lex_dialect<'s, T>(source: &'s str) -> Vec<Token>
where
    T: Logos<'s, Source = str> + Copy,
    SyntaxKind: From<T>,
{
    let mut tokens = Vec::new();
    let mut lexer = T::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(tok)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(SyntaxKind::Error, range_to_text_range(start..end)));
                }
                tokens.push(Token::new(tok.into(), range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(
                        SyntaxKind::Error,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    tokens
}

#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[Range::<usize>::from(token.span)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_simple_production_header() {
        let tokens = lex("Identifier: 'a' ;", Dialect::Lexical);
        let kinds: Vec<SyntaxKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Id,
                SyntaxKind::Colon,
                SyntaxKind::QuotedChar,
                SyntaxKind::Semi,
            ]
        );
    }

    #[test]
    fn repeat_range_is_lexical_only() {
        let tokens = lex("{3,5}", Dialect::Lexical);
        assert_eq!(tokens[0].kind, SyntaxKind::RepeatRange);
    }

    #[test]
    fn brace_group_delimiters_are_syntactic_only() {
        let tokens = lex("{ Term }", Dialect::Syntactic);
        let kinds: Vec<SyntaxKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::BraceOpen, SyntaxKind::Id, SyntaxKind::BraceClose]
        );
    }

    #[test]
    fn optional_group_does_not_get_swallowed_as_a_bracket_expression() {
        let tokens = lex("[ Term ]", Dialect::Syntactic);
        let kinds: Vec<SyntaxKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::BracketOpen,
                SyntaxKind::Id,
                SyntaxKind::BracketClose,
            ]
        );
    }

    #[test]
    fn ordered_group_openers_are_their_own_tokens() {
        let tokens = lex("{/ x }", Dialect::Syntactic);
        assert_eq!(tokens[0].kind, SyntaxKind::BraceOpenOrdered);
    }

    #[test]
    fn bare_ordinary_character_falls_back_past_identifier() {
        let tokens = lex("#", Dialect::Lexical);
        assert_eq!(tokens[0].kind, SyntaxKind::OrdChar);
    }

    #[test]
    fn single_letter_is_an_identifier_not_an_ordinary_char() {
        let tokens = lex("a", Dialect::Lexical);
        assert_eq!(tokens[0].kind, SyntaxKind::Id);
    }
}
