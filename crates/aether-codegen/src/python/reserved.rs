//! Python's reserved words, so an identifier coined from a grammar's tag or
//! nonterminal name never collides with one when emitted as a Python
//! `class`/`def`/variable name (spec.md §4.5).

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield", "match", "case",
];

pub fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_keywords() {
        assert!(is_reserved("class"));
        assert!(is_reserved("import"));
        assert!(!is_reserved("Digit"));
    }
}
