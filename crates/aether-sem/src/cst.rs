//! Syntax kinds for the grammar meta-language.
//!
//! `SyntaxKind` serves dual roles: token kinds and node kinds assembled by
//! the parser, with a `__LAST` sentinel bounding the `repr(u16)` transmute
//! `AetherLang` needs — the same shape `plotnik-compiler`'s CST uses.
//!
//! Tokenizing is dialect-specific rather than one shared Logos enum: the
//! lexical dialect's `{m,n}` repeat-range literal and `[...]` bracket
//! expression are free-form character classes that would otherwise swallow
//! the syntactic dialect's bare `{`/`}`/`[`/`]` group delimiters whole (a
//! `BracketExpr` regex happily matches across `[ Term ]`, whitespace and
//! all, since nothing inside it is excluded but `]` and `\`). Two small
//! Logos enums — [`LexToken`] and [`SynToken`] in [`crate::lexer`] — each
//! see only their own dialect's token set and both map onto this one
//! `SyntaxKind`.
use rowan::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    Colon = 0,
    Semi,
    At,
    ParenOpen,
    ParenClose,
    Pipe,
    Comma,
    AmpAmp,
    PipePipe,
    Bang,

    /// Lexical-only: specifier sign / iteration operators / pattern atoms.
    Plus,
    Minus,
    Star,
    Question,
    KwIgnore,
    RepeatRange,
    Dot,
    QuotedChar,
    BracketExpr,
    OrdChar,

    /// Syntactic-only: ordered alternation and group delimiters.
    KwStart,
    Slash,
    BraceOpen,
    BraceOpenOrdered,
    BraceClose,
    BracketOpen,
    BracketOpenOrdered,
    BracketClose,

    Id,
    Error,

    // --- Node kinds ---
    Root,
    Production,
    ProductionHeader,
    ProductionBody,
    Specifiers,
    PositiveSpec,
    NegativeSpec,
    IgnoreSpec,
    StartSpec,
    Condition,
    CondOr,
    CondAnd,
    CondNot,
    CondParen,
    CondName,
    Selection,
    OrderedSelection,
    Sequence,
    IterationGroup,
    OptionalGroup,
    IdentRef,
    Literal,
    Wildcard,
    Bracket,
    Repeat,

    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        false
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AetherLang {}

impl Language for AetherLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<AetherLang>;
pub type SyntaxToken = rowan::SyntaxToken<AetherLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;
