use std::hash::{Hash, Hasher};

use crate::core::{Constraint, Sv};
use crate::oracle::Symbol;
use crate::state::point::ProgramPoint;

/// Raised by [ProgramState::unstack] when asked to pop more than the stack
/// holds. The walker turns this into `EngineError::Internal`: an invariant
/// violation, never an expected outcome of a well-formed CFG.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StackUnderflow {
    pub requested: usize,
    pub available: usize,
}

/// Immutable snapshot of everything the engine knows at one program point
/// along one path. All mutators are pure: they return a new `ProgramState`
/// sharing structure with the old one (backed by `im`'s persistent maps and
/// vector, the same approach `aries_plan_validator::models::state::State`
/// takes for its own immutable world-state).
///
/// Two `ProgramState`s at the same program point that are value-equal are
/// interchangeable for exploration (deduplicated by the exploded graph).
#[derive(Clone, Debug, Default)]
pub struct ProgramState {
    values: im::HashMap<Symbol, Sv>,
    constraints: im::HashMap<Sv, Constraint>,
    stack: im::Vector<Sv>,
    visited: im::HashMap<ProgramPoint, u32>,
}

impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && self.constraints == other.constraints
            && self.stack == other.stack
            && self.visited == other.visited
    }
}
impl Eq for ProgramState {}

/// `im::HashMap` iterates in an unspecified order, so a `Hash` impl built by
/// folding entries in iteration order would not agree with the order
/// -independent `PartialEq` above. Each entry's hash is combined with a
/// commutative operator (wrapping addition) so the result only depends on
/// the map's content, matching `PartialEq`.
impl Hash for ProgramState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_map_order_independent(&self.values, state);
        hash_map_order_independent(&self.constraints, state);
        for sv in self.stack.iter() {
            sv.hash(state);
        }
        hash_map_order_independent(&self.visited, state);
    }
}

fn hash_map_order_independent<K: Hash, V: Hash, H: Hasher>(map: &im::HashMap<K, V>, state: &mut H) {
    let mut combined: u64 = 0;
    for (k, v) in map.iter() {
        let mut entry_hasher = std::collections::hash_map::DefaultHasher::new();
        k.hash(&mut entry_hasher);
        v.hash(&mut entry_hasher);
        combined = combined.wrapping_add(entry_hasher.finish());
    }
    combined.hash(state);
}

impl ProgramState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- values ----

    pub fn get(&self, symbol: Symbol) -> Option<Sv> {
        self.values.get(&symbol).copied()
    }

    /// Binds `symbol` to `sv` in `values`, returning the updated state.
    pub fn put(&self, symbol: Symbol, sv: Sv) -> ProgramState {
        ProgramState {
            values: self.values.update(symbol, sv),
            ..self.clone()
        }
    }

    pub fn bound_symbols(&self) -> impl Iterator<Item = (Symbol, Sv)> + '_ {
        self.values.iter().map(|(s, v)| (*s, *v))
    }

    // ---- constraints ----

    pub fn constraint_of(&self, sv: Sv) -> Option<Constraint> {
        self.constraints.get(&sv).copied()
    }

    pub fn constraints_len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns a copy of this state with `constraints[sv] = kind`. Does not
    /// check feasibility: callers go through `ConstraintManager::set_constraint`
    /// for that.
    pub fn with_constraint(&self, sv: Sv, kind: Constraint) -> ProgramState {
        ProgramState {
            constraints: self.constraints.update(sv, kind),
            ..self.clone()
        }
    }

    // ---- stack ----

    pub fn stack_top(&self) -> Option<&Sv> {
        self.stack.last()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Pushes `sv` onto the stack.
    pub fn stack_value(&self, sv: Sv) -> ProgramState {
        let mut stack = self.stack.clone();
        stack.push_back(sv);
        ProgramState { stack, ..self.clone() }
    }

    /// Pops `n` operands. `popped` is ordered deepest-first (the same order
    /// the values appear in the stack, bottom to top, restricted to the
    /// popped suffix).
    pub fn unstack(&self, n: usize) -> Result<(ProgramState, Vec<Sv>), StackUnderflow> {
        if n > self.stack.len() {
            return Err(StackUnderflow {
                requested: n,
                available: self.stack.len(),
            });
        }
        let mut stack = self.stack.clone();
        let popped_tail = stack.split_off(self.stack.len() - n);
        let popped = popped_tail.into_iter().collect();
        Ok((ProgramState { stack, ..self.clone() }, popped))
    }

    /// Discards every temporary on the stack (used after an expression
    /// statement's child has been fully processed).
    pub fn clear_stack(&self) -> ProgramState {
        ProgramState {
            stack: im::Vector::new(),
            ..self.clone()
        }
    }

    // ---- visited ----

    pub fn number_of_times_visited(&self, point: ProgramPoint) -> u32 {
        self.visited.get(&point).copied().unwrap_or(0)
    }

    pub fn with_visited(&self, point: ProgramPoint, count: u32) -> ProgramState {
        ProgramState {
            visited: self.visited.update(point, count),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};

    fn sym(n: u32) -> Symbol {
        Symbol::from_u32(n)
    }

    #[test]
    fn unstack_pops_deepest_first_and_shrinks_the_stack() {
        let state = ProgramState::new().stack_value(TRUE_LITERAL).stack_value(FALSE_LITERAL).stack_value(NULL_LITERAL);
        let (state, popped) = state.unstack(2).unwrap();
        assert_eq!(popped, vec![FALSE_LITERAL, NULL_LITERAL]);
        assert_eq!(state.stack_len(), 1);
        assert_eq!(state.stack_top(), Some(&TRUE_LITERAL));
    }

    #[test]
    fn unstack_fails_loudly_past_the_stack_depth() {
        let state = ProgramState::new().stack_value(TRUE_LITERAL);
        let err = state.unstack(2).unwrap_err();
        assert_eq!(err, StackUnderflow { requested: 2, available: 1 });
    }

    #[test]
    fn clear_stack_empties_regardless_of_depth() {
        let state = ProgramState::new().stack_value(TRUE_LITERAL).stack_value(FALSE_LITERAL);
        assert_eq!(state.clear_stack().stack_len(), 0);
    }

    #[test]
    fn equal_states_hash_equal_regardless_of_binding_insertion_order() {
        let a = ProgramState::new().put(sym(0), TRUE_LITERAL).put(sym(1), FALSE_LITERAL);
        let b = ProgramState::new().put(sym(1), FALSE_LITERAL).put(sym(0), TRUE_LITERAL);
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn visited_count_defaults_to_zero_and_updates_purely() {
        let point = ProgramPoint::new(crate::state::BlockId::from_u32(0), 0);
        let state = ProgramState::new();
        assert_eq!(state.number_of_times_visited(point), 0);
        let bumped = state.with_visited(point, 1);
        assert_eq!(bumped.number_of_times_visited(point), 1);
        assert_eq!(state.number_of_times_visited(point), 0, "original state is untouched");
    }
}
