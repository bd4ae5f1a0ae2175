use crate::create_ref_type;

create_ref_type!(Sv);

/// Identifies the syntax node that produced a [Sv], kept only so checkers and
/// logs can point back at source locations. The engine never inspects it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// The distinguished `true` literal. Every feasible [crate::state::ProgramState]
/// agrees on its identity: it is never freshly minted.
pub const TRUE_LITERAL: Sv = Sv::from_u32(0);
/// The distinguished `false` literal.
pub const FALSE_LITERAL: Sv = Sv::from_u32(1);
/// The distinguished `null` literal.
pub const NULL_LITERAL: Sv = Sv::from_u32(2);

/// Metadata kept about a [Sv] by the constraint manager that minted it.
///
/// `origin` is informational only (diagnostics); `computed_from` is the
/// provenance DAG used by checkers to trace a boolean result back to its
/// operands (`computed_from` in spec terms).
#[derive(Debug, Clone, Default)]
pub struct SvMeta {
    pub origin: Option<NodeId>,
    pub computed_from: Option<smallvec::SmallVec<[Sv; 2]>>,
}
