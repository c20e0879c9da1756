//! Python target emitter: assembles `common.py`/`lexical.py`/`syntactic.py`
//! from the target-neutral folds in the parent module. Grounded on
//! `plotnik-compiler::typegen::typescript`'s `Emitter`/`Config` split, but
//! simpler — each output file here is independent text assembled from the
//! symbol tables directly, with no reachable-type graph to sort first.

mod config;
mod reserved;

pub use config::Config;

use aether_sem::ast::Root;
use aether_sem::conditions::ConditionTable;
use aether_sem::lexical::LexicalTable;
use aether_sem::syntactic::SyntacticTable;

/// The three files one `aether` run produces, keyed the way
/// `aether-cli` writes them to the output directory.
#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    pub common_py: String,
    pub lexical_py: String,
    pub syntactic_py: String,
}

/// Suffixes `name` with an underscore if it collides with a Python
/// reserved word; otherwise returns it unchanged.
pub fn escape_ident(name: &str) -> String {
    if reserved::is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Runs every fold over the already-built symbol tables and assembles the
/// three output files.
pub fn generate(
    syntactic_root: &Root,
    lexical: &LexicalTable,
    syntactic: &SyntacticTable,
    conditions: &ConditionTable,
    config: &Config,
) -> GeneratedFiles {
    tracing::debug!(
        terminals = lexical.terminals.iter().count(),
        nonterminals = syntactic.nonterminals.iter().count(),
        conditions = conditions.len(),
        "generating python target"
    );

    GeneratedFiles {
        common_py: crate::common::emit(conditions),
        lexical_py: crate::lexical::emit(lexical, conditions, config),
        syntactic_py: crate::syntactic::emit(syntactic_root, syntactic, lexical, conditions, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_sem::ast::Root as AstRoot;
    use aether_sem::parser::{parse, Dialect};

    #[test]
    fn reserved_name_gets_escaped() {
        assert_eq!(escape_ident("class"), "class_");
        assert_eq!(escape_ident("Digit"), "Digit");
    }

    #[test]
    fn end_to_end_grammar_emits_three_files() {
        let lex_src = "Digit: '0' | '1' ;";
        let syn_src = "Expr: Expr Digit | Digit ;";

        let lex_node = parse(lex_src, "lexical.aether", Dialect::Lexical).unwrap().syntax_node();
        let lex_root = AstRoot::cast(lex_node).unwrap();

        let syn_node = parse(syn_src, "syntactic.aether", Dialect::Syntactic).unwrap().syntax_node();
        let syn_root = AstRoot::cast(syn_node).unwrap();

        let mut conditions = ConditionTable::build(&lex_root, &syn_root);
        let lexical = aether_sem::lexical::build(&lex_root, &mut conditions, lex_src, "lexical.aether").unwrap();
        let syntactic =
            aether_sem::syntactic::build(&syn_root, &lexical, &mut conditions, syn_src, "syntactic.aether").unwrap();

        let files = generate(&syn_root, &lexical, &syntactic, &conditions, &Config::default());

        assert!(files.common_py.contains("class Condition(Flag)"));
        assert!(files.lexical_py.contains("TAGS[0]"));
        assert!(files.syntactic_py.contains("NONTERMS[0]"));
        assert!(files.syntactic_py.contains("ascend=True"));
    }

    #[test]
    fn conditional_grammar_emits_a_condition_member() {
        let lex_src = indoc::indoc! {"
            Digit: '0' | '1' ;
            Comment(ignore@(InComment)): [a-z]+ ;
        "};
        let syn_src = "Expr: Digit ;";

        let lex_node = parse(lex_src, "lexical.aether", Dialect::Lexical).unwrap().syntax_node();
        let lex_root = AstRoot::cast(lex_node).unwrap();

        let syn_node = parse(syn_src, "syntactic.aether", Dialect::Syntactic).unwrap().syntax_node();
        let syn_root = AstRoot::cast(syn_node).unwrap();

        let mut conditions = ConditionTable::build(&lex_root, &syn_root);
        let lexical = aether_sem::lexical::build(&lex_root, &mut conditions, lex_src, "lexical.aether").unwrap();
        let syntactic =
            aether_sem::syntactic::build(&syn_root, &lexical, &mut conditions, syn_src, "syntactic.aether").unwrap();

        let files = generate(&syn_root, &lexical, &syntactic, &conditions, &Config::default());

        assert!(files.common_py.contains("InComment = auto()"));
    }
}
