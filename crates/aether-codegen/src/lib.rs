//! Fold-based code-generator back end.
//!
//! Lifts `aether-sem`'s symbol tables to target-language source text.
//! `common`/`condition`/`lexical`/`expression`/`syntactic` are target-neutral
//! folds that produce fragments of source as plain `String`s; `python`
//! assembles those fragments into `common.py`/`lexical.py`/`syntactic.py`,
//! the one target this generator ships. Grounded on
//! `plotnik-compiler::typegen::typescript`'s `Emitter` (an output-buffer
//! struct fed by per-kind emit methods) generalized from one language to a
//! trait any future target implements.

pub mod common;
pub mod condition;
pub mod expression;
pub mod lexical;
pub mod python;
pub mod syntactic;

pub use python::generate;
