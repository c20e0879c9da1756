//! Reads a grammar directory, builds both symbol tables, and writes the
//! emitted target files — the one thing this binary does (spec.md §6).

use std::fs;
use std::path::Path;

use aether_core::{AetherError, AetherResult};
use aether_sem::ast::Root;
use aether_sem::conditions::ConditionTable;
use aether_sem::parser::{parse, Dialect};

use crate::args::Args;

pub fn run(args: &Args) -> AetherResult<()> {
    let lex_path = args.input_dir.join("lexical.aether");
    let syn_path = args.input_dir.join("syntactic.aether");

    let lex_src = read_to_string(&lex_path)?;
    let syn_src = read_to_string(&syn_path)?;

    let lex_file = lex_path.to_string_lossy().into_owned();
    let syn_file = syn_path.to_string_lossy().into_owned();

    let lex_root = Root::cast(parse(&lex_src, &lex_file, Dialect::Lexical)?.syntax_node())
        .expect("parse() guarantees a well-formed Root node");
    let syn_root = Root::cast(parse(&syn_src, &syn_file, Dialect::Syntactic)?.syntax_node())
        .expect("parse() guarantees a well-formed Root node");

    let mut conditions = ConditionTable::build(&lex_root, &syn_root);

    let lexical = aether_sem::lexical::build(&lex_root, &mut conditions, &lex_src, &lex_file)?;
    let syntactic = aether_sem::syntactic::build(&syn_root, &lexical, &mut conditions, &syn_src, &syn_file)?;

    let config = aether_codegen::python::Config::default();
    let files = aether_codegen::generate(&syn_root, &lexical, &syntactic, &conditions, &config);

    write_output(&args.output, "common.py", &files.common_py)?;
    write_output(&args.output, "lexical.py", &files.lexical_py)?;
    write_output(&args.output, "syntactic.py", &files.syntactic_py)?;

    Ok(())
}

fn read_to_string(path: &Path) -> AetherResult<String> {
    fs::read_to_string(path).map_err(|e| AetherError::Io {
        position: aether_core::Position::start(path.to_string_lossy().as_ref()),
        description: format!("reading {}: {e}", path.display()),
    })
}

fn write_output(dir: &Path, name: &str, contents: &str) -> AetherResult<()> {
    fs::create_dir_all(dir).map_err(|e| AetherError::Io {
        position: aether_core::Position::start(name),
        description: format!("creating output directory {}: {e}", dir.display()),
    })?;

    let path = dir.join(name);
    fs::write(&path, contents).map_err(|e| AetherError::Io {
        position: aether_core::Position::start(name),
        description: format!("writing {}: {e}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn write_grammar(dir: &Path) {
        fs::write(dir.join("lexical.aether"), "Digit: '0' | '1' ;\n").unwrap();
        fs::write(dir.join("syntactic.aether"), "Expr: Digit Expr | Digit ;\n").unwrap();
    }

    #[test]
    fn run_emits_three_files() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_grammar(input_dir.path());

        let args = Args::try_parse_from([
            "aether",
            "-o",
            output_dir.path().to_str().unwrap(),
            input_dir.path().to_str().unwrap(),
        ])
        .unwrap();

        run(&args).unwrap();

        for name in ["common.py", "lexical.py", "syntactic.py"] {
            assert!(output_dir.path().join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn unsupported_language_is_rejected_at_parse_time() {
        let result = Args::try_parse_from(["aether", "-L", "javascript", "some-dir"]);
        assert!(result.is_err());
    }
}
