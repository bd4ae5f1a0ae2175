use crate::collections::RefStore;
use crate::core::value::{NodeId, Sv, SvMeta, FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};
use crate::oracle::Symbol;
use crate::state::ProgramState;

/// A tag attached to a [Sv] within a given [ProgramState].
///
/// The only domain required by spec.md is nullness, but the type is kept
/// open (a plain enum rather than a bitset of exactly two values) so a
/// future reasoner (e.g. numeric ranges) can add a variant without
/// disturbing the nullness kind: no two kinds ever share a value, and a
/// `ProgramState` never stores two constraints of the same kind for one SV.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    Null,
    NotNull,
}

impl Constraint {
    /// The tag that rules out this one for the same SV in the same state.
    fn opposite(self) -> Constraint {
        match self {
            Constraint::Null => Constraint::NotNull,
            Constraint::NotNull => Constraint::Null,
        }
    }
}

/// Literal value read off the source text, handed to [ConstraintManager::eval_literal].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LiteralKind {
    Null,
    True,
    False,
    Other,
}

/// Factory for [Sv]s and the only component that can refine a [ProgramState]'s
/// constraint store. One instance is owned by a [crate::walker::Walker] for
/// the lifetime of a single `execute`/`visit_method` call; its arena is
/// discarded with it.
#[derive(Default)]
pub struct ConstraintManager {
    arena: RefStore<Sv, SvMeta>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        let mut arena = RefStore::default();
        // Reserve the three singleton slots so their indices line up with
        // TRUE_LITERAL/FALSE_LITERAL/NULL_LITERAL's hardcoded positions.
        for _ in 0..3 {
            arena.push(SvMeta::default());
        }
        ConstraintManager { arena }
    }

    /// Mints a fresh SV with no constraints, recording `origin` for diagnostics.
    pub fn new_sv(&mut self, origin: Option<NodeId>) -> Sv {
        self.arena.push(SvMeta {
            origin,
            computed_from: None,
        })
    }

    /// Mints a fresh "unknown, non-null-ish" SV meant to replace an existing
    /// binding. Callers combine it with [Constraint::NotNull] as needed (used
    /// by the field-haircut reset).
    pub fn supersede_sv(&mut self, _variable: Symbol) -> Sv {
        self.arena.push(SvMeta::default())
    }

    /// Evaluates a literal node into its SV: the two boolean/null singletons,
    /// or a fresh SV for anything else (numeric/string literals have no
    /// dedicated constant identity in this engine).
    pub fn eval_literal(&mut self, lit: LiteralKind) -> Sv {
        match lit {
            LiteralKind::Null => NULL_LITERAL,
            LiteralKind::True => TRUE_LITERAL,
            LiteralKind::False => FALSE_LITERAL,
            LiteralKind::Other => self.new_sv(None),
        }
    }

    /// Records that `sv` was computed from `operands`, in order. Has no
    /// semantic effect on the constraint store; used only by checkers that
    /// trace provenance (e.g. through a chain of boolean operators). A
    /// no-op on the three literal singletons, which are never "computed".
    pub fn computed_from(&mut self, sv: Sv, operands: &[Sv]) {
        if sv == TRUE_LITERAL || sv == FALSE_LITERAL || sv == NULL_LITERAL {
            return;
        }
        self.arena.get_mut(sv).computed_from = Some(operands.iter().copied().collect());
    }

    pub fn provenance(&self, sv: Sv) -> Option<&[Sv]> {
        self.arena.get(sv).computed_from.as_deref()
    }

    pub fn origin(&self, sv: Sv) -> Option<NodeId> {
        self.arena.get(sv).origin
    }

    /// Returns the set of successor states consistent with `sv` having
    /// constraint `kind` in `state`. Empty means infeasible.
    pub fn set_constraint(&self, sv: Sv, state: &ProgramState, kind: Constraint) -> Vec<ProgramState> {
        match state.constraint_of(sv) {
            Some(existing) if existing == kind.opposite() => vec![],
            Some(existing) if existing == kind => vec![state.clone()],
            _ => vec![state.with_constraint(sv, kind)],
        }
    }

    /// Same as [Self::set_constraint] but asserts exactly one successor.
    pub fn set_single_constraint(&self, sv: Sv, state: &ProgramState, kind: Constraint) -> Option<ProgramState> {
        let mut states = self.set_constraint(sv, state, kind);
        assert!(states.len() <= 1, "set_single_constraint produced more than one successor");
        states.pop()
    }

    /// Splits `state` into its false-feasible and true-feasible successors,
    /// based on the SV on top of the operand stack (the branch condition's
    /// result). The top-of-stack SV is left untouched; §4.4 pops it once the
    /// branch has been taken.
    pub fn assume_dual(&self, state: &ProgramState) -> (Vec<ProgramState>, Vec<ProgramState>) {
        let top = *state.stack_top().expect("assume_dual called on an empty stack");
        if top == TRUE_LITERAL {
            return (vec![], vec![state.clone()]);
        }
        if top == FALSE_LITERAL || top == NULL_LITERAL {
            return (vec![state.clone()], vec![]);
        }
        let false_states = self.set_constraint(top, state, Constraint::Null);
        let true_states = self.set_constraint(top, state, Constraint::NotNull);
        (false_states, true_states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProgramState;

    #[test]
    fn set_constraint_is_infeasible_against_the_opposite() {
        let mut cm = ConstraintManager::new();
        let sv = cm.new_sv(None);
        let state = ProgramState::new().with_constraint(sv, Constraint::NotNull);
        assert!(cm.set_constraint(sv, &state, Constraint::Null).is_empty());
    }

    #[test]
    fn set_constraint_is_a_no_op_when_already_implied() {
        let mut cm = ConstraintManager::new();
        let sv = cm.new_sv(None);
        let state = ProgramState::new().with_constraint(sv, Constraint::NotNull);
        let states = cm.set_constraint(sv, &state, Constraint::NotNull);
        assert_eq!(states, vec![state]);
    }

    #[test]
    fn set_constraint_refines_an_unconstrained_sv() {
        let mut cm = ConstraintManager::new();
        let sv = cm.new_sv(None);
        let state = ProgramState::new();
        let states = cm.set_constraint(sv, &state, Constraint::Null);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].constraint_of(sv), Some(Constraint::Null));
    }

    /// Round-trip from spec §8: `assume_dual` followed by re-imposing the
    /// complementary constraint on each branch it produced yields the empty
    /// set — the two branches are mutually exclusive.
    #[test]
    fn assume_dual_branches_are_mutually_exclusive() {
        let mut cm = ConstraintManager::new();
        let cond = cm.new_sv(None);
        let state = ProgramState::new().stack_value(cond);

        let (false_states, true_states) = cm.assume_dual(&state);
        assert_eq!(false_states.len(), 1);
        assert_eq!(true_states.len(), 1);

        for s in &false_states {
            assert!(cm.set_constraint(cond, s, Constraint::NotNull).is_empty());
        }
        for s in &true_states {
            assert!(cm.set_constraint(cond, s, Constraint::Null).is_empty());
        }
    }

    #[test]
    fn assume_dual_on_the_true_literal_has_no_false_branch() {
        let cm = ConstraintManager::new();
        let state = ProgramState::new().stack_value(TRUE_LITERAL);
        let (false_states, true_states) = cm.assume_dual(&state);
        assert!(false_states.is_empty());
        assert_eq!(true_states.len(), 1);
    }

    #[test]
    fn assume_dual_on_a_null_literal_has_no_true_branch() {
        let cm = ConstraintManager::new();
        let state = ProgramState::new().stack_value(NULL_LITERAL);
        let (false_states, true_states) = cm.assume_dual(&state);
        assert_eq!(false_states.len(), 1);
        assert!(true_states.is_empty());
    }
}
