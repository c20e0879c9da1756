//! Grammar meta-language front end (reads `lexical.aether`/`syntactic.aether`
//! into an AST) and the symbol-table builders that turn that AST into the
//! NFA fragments and FIRST/SCC data `aether-codegen` folds into target code.
//!
//! `cst`/`lexer`/`parser`/`ast` are grounded on `plotnik-compiler::parser`'s
//! logos-tokenize, rowan-build-green-tree, typed-AST-view pipeline — this is
//! "new" relative to `spec.md`, which treats the meta-language's own grammar
//! as out-of-scope input data; something still has to read it. `symtab`,
//! `lexical`, and `syntactic` are the `spec.md` §3/§4.4 symbol-table and
//! NFA/FIRST-set construction, ported from
//! `examples/original_source/lib/Python/transmuter/front/semantic/*.py`.

pub mod ast;
pub mod conditions;
pub mod cst;
pub mod lexer;
pub mod lexical;
pub mod parser;
pub mod symtab;
pub mod syntactic;

pub use parser::Dialect;
