//! The fatal error taxonomy from spec.md §7, plus the parallel non-fatal
//! warning class.

use std::fmt;

use crate::position::Position;

/// A fatal error, carrying the position it was raised at.
///
/// Every variant corresponds to one row of spec.md §7's table except
/// "Internal", which is a private control-flow signal inside `aether-parse`
/// and never becomes an `AetherError`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AetherError {
    #[error("Lexical Error: could not match any terminal")]
    NoTerminal { position: Position },

    #[error("Syntactic Error: could not match any starting symbol from given conditions")]
    NoStart { position: Position },

    #[error("Syntactic Error: matched multiple starting symbols from given conditions")]
    MultipleStarts { position: Position },

    #[error("Syntactic Error: could not derive input from any production rule")]
    NoDerivation { position: Position },

    /// Raised reading `lexical.aether`/`syntactic.aether` themselves, not by
    /// the generated lexer/parser's own BSR engine.
    #[error("Syntactic Error: {description}")]
    MetaSyntax {
        position: Position,
        description: String,
    },

    #[error("Semantic Error: duplicate definition of '{name}'")]
    DuplicateSymbolDefinition { position: Position, name: String },

    #[error("Semantic Error: undefined symbol '{name}'")]
    UndefinedSymbol { position: Position, name: String },

    #[error("Semantic Error: grammar is ambiguous")]
    AmbiguousGrammar { position: Position },

    #[error("I/O Error: {description}")]
    Io {
        position: Position,
        description: String,
    },
}

impl AetherError {
    pub fn position(&self) -> &Position {
        match self {
            AetherError::NoTerminal { position }
            | AetherError::NoStart { position }
            | AetherError::MultipleStarts { position }
            | AetherError::NoDerivation { position }
            | AetherError::MetaSyntax { position, .. }
            | AetherError::DuplicateSymbolDefinition { position, .. }
            | AetherError::UndefinedSymbol { position, .. }
            | AetherError::AmbiguousGrammar { position }
            | AetherError::Io { position, .. } => position,
        }
    }

    /// The `KIND` field of the `FILE:LINE:COLUMN: KIND: description` CLI
    /// diagnostic line from spec.md §6.
    pub fn kind(&self) -> &'static str {
        match self {
            AetherError::NoTerminal { .. } => "Lexical Error",
            AetherError::NoStart { .. } | AetherError::MultipleStarts { .. } => "Syntactic Error",
            AetherError::NoDerivation { .. } | AetherError::MetaSyntax { .. } => "Syntactic Error",
            AetherError::DuplicateSymbolDefinition { .. }
            | AetherError::UndefinedSymbol { .. }
            | AetherError::AmbiguousGrammar { .. } => "Semantic Error",
            AetherError::Io { .. } => "I/O Error",
        }
    }

    /// Renders the single-line diagnostic spec.md §6 requires on an
    /// uncaught exception: `FILE:LINE:COLUMN: KIND: description`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.position(), self)
    }
}

/// A non-fatal counterpart to [`AetherError`]. Collected rather than
/// propagated; spec.md §7 calls this "warnings use a parallel class with the
/// same shape but do not abort."
#[derive(Debug, Clone, thiserror::Error)]
#[error("{position}: Warning: {description}")]
pub struct AetherWarning {
    pub position: Position,
    pub description: String,
}

impl AetherWarning {
    pub fn new(position: Position, description: impl Into<String>) -> Self {
        AetherWarning {
            position,
            description: description.into(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Accumulates warnings over the course of a run. Unlike `AetherError`,
/// warnings never abort the pipeline; the CLI flushes this sink to stderr
/// once the run completes.
#[derive(Debug, Clone, Default)]
pub struct WarningSink {
    warnings: Vec<AetherWarning>,
}

impl WarningSink {
    pub fn new() -> Self {
        WarningSink::default()
    }

    pub fn push(&mut self, warning: AetherWarning) {
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AetherWarning> {
        self.warnings.iter()
    }

    pub fn extend(&mut self, other: WarningSink) {
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for WarningSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "{}", warning.render())?;
        }

        Ok(())
    }
}

pub type AetherResult<T> = std::result::Result<T, AetherError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::start("g.aether")
    }

    #[test]
    fn render_matches_cli_diagnostic_shape() {
        let err = AetherError::NoTerminal { position: pos() };
        assert_eq!(
            err.render(),
            "g.aether:1:1: Lexical Error: could not match any terminal"
        );
    }

    #[test]
    fn warning_sink_accumulates() {
        let mut sink = WarningSink::new();
        sink.push(AetherWarning::new(pos(), "unused condition 'foo'"));
        assert_eq!(sink.iter().count(), 1);
        assert!(!sink.is_empty());
    }
}
