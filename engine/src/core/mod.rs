//! The symbolic value algebra: opaque [Sv] identities, the nullness
//! [Constraint] domain, and the [ConstraintManager] factory that mints SVs
//! and refines states against the constraint store (spec components C1/C2).

mod constraint;
mod value;

pub use constraint::{Constraint, ConstraintManager, LiteralKind};
pub use value::{NodeId, Sv, SvMeta, FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};
