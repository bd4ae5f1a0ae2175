//! A symbolic execution engine for null-dereference analysis.
//!
//! The engine walks a procedure's control-flow graph once per feasible path,
//! carrying an immutable [state::ProgramState] (variable bindings, an
//! operand stack, and a nullness constraint store) along an exploded graph
//! of `(program point, state)` pairs. A pluggable set of [checkers::Checker]s
//! observes every statement transition and reports defects to an abstract
//! sink.
//!
//! Parsing source text into a [cfg::Cfg] and resolving identifiers through
//! [oracle::SymbolOracle]/[oracle::AnnotationOracle] are the driver's job;
//! this crate only consumes those collaborators.

pub mod cfg;
pub mod checkers;
pub mod collections;
pub mod config;
pub mod core;
pub mod errors;
pub mod graph;
pub mod oracle;
pub mod state;
pub mod walker;

/// Re-exports the types most call sites need, mirroring how the rest of
/// this codebase's crates expose a single import surface.
pub mod prelude {
    pub use crate::cfg::{AssignmentTarget, Block, Cfg, ConditionInfo, Procedure, Statement, Terminator, TerminatorKind, TreeKind};
    pub use crate::checkers::{Checker, ConditionAlwaysTrueOrFalse, Diagnostic, DiagnosticSink, Dispatcher, NullDereference};
    pub use crate::config::EngineConfig;
    pub use crate::core::{Constraint, ConstraintManager, LiteralKind, NodeId, Sv};
    pub use crate::errors::EngineError;
    pub use crate::oracle::{AnnotationOracle, Symbol, SymbolKind, SymbolOracle};
    pub use crate::state::{BlockId, ProgramPoint, ProgramState};
    pub use crate::walker::{ExecutionReport, Walker};
}
