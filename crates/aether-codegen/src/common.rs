//! `CommonFold`: emits `common.py`'s condition enumeration, the one piece
//! both `lexical.py` and `syntactic.py` import — mirrors the original's
//! single `TransmuterConditions(IntFlag)` class, generated with one member
//! per name [`ConditionTable`] assigned an id to.

use aether_sem::conditions::ConditionTable;

/// Emits the full text of `common.py`. `common.py` defines `Condition`
/// itself, so it needs no import of the module name the other two files
/// use to reach it.
pub fn emit(conditions: &ConditionTable) -> String {
    let mut out = String::new();
    out.push_str("\"\"\"Generated by aether. Do not edit by hand.\"\"\"\n\n");
    out.push_str("from enum import Flag, auto\n\n\n");
    out.push_str("class Condition(Flag):\n");

    if conditions.is_empty() {
        out.push_str("    pass\n");
    } else {
        for (_, name) in conditions.iter() {
            out.push_str(&format!("    {} = auto()\n", crate::python::escape_ident(name)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_member_per_condition() {
        let mut table = ConditionTable::default();
        table.id("Debug");
        table.id("Strict");
        let text = emit(&table);
        assert!(text.contains("class Condition(Flag):"));
        assert!(text.contains("Debug = auto()"));
        assert!(text.contains("Strict = auto()"));
    }

    #[test]
    fn empty_table_emits_pass() {
        let table = ConditionTable::default();
        let text = emit(&table);
        assert!(text.contains("pass"));
    }
}
