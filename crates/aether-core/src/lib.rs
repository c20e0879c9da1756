//! Common primitives shared by every stage of the Aether compiler-compiler
//! pipeline: source positions, the fatal/non-fatal error taxonomy, named
//! condition sets, and Tarjan's SCC algorithm (used by both the parser
//! engine's left-recursion setup and the syntactic symbol table's FIRST-set
//! reduction).

pub mod conditions;
pub mod error;
pub mod position;
pub mod scc;

pub use conditions::{ConditionId, ConditionSet, ConditionTree};
pub use error::{AetherError, AetherResult, AetherWarning, WarningSink};
pub use position::Position;
pub use scc::compute_sccs;
