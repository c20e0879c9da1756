//! Command-line argument shape, spec.md §6:
//! `aether [-v/--version] [-L/--language LANG] [-o/--output DIR] INPUT_DIR`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// The one target this binary knows how to emit. An unrecognized `-L` value
/// is a clap usage error, not an `AetherError`: a CLI-surface concern, not a
/// pipeline diagnostic.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum Language {
    Python,
}

#[derive(Parser, Debug)]
#[command(
    name = "aether",
    version,
    about = "Compiler-compiler: grammar directory in, lexer/parser source out",
    disable_version_flag = true
)]
pub struct Args {
    /// Print version information and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Target language to emit. Only "python" ships today.
    #[arg(short = 'L', long = "language", default_value = "python", value_name = "LANG")]
    pub language: Language,

    /// Directory the emitted files are written into.
    #[arg(short = 'o', long = "output", default_value = ".", value_name = "DIR")]
    pub output: PathBuf,

    /// Directory containing `lexical.aether` and `syntactic.aether`.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,
}
