//! The exploded graph (component C4): the interned set of
//! `(program point, program state)` nodes reached during exploration.

use std::collections::HashMap;

use crate::state::{ProgramPoint, ProgramState};

/// A node of the exploded graph. `is_new` is true iff this node was created
/// by the lookup that returned it, rather than already present in the
/// graph's cache (i.e. this exact `(point, state)` pair has not been
/// explored before).
#[derive(Debug, Clone)]
pub struct Node {
    pub point: ProgramPoint,
    pub state: ProgramState,
    pub is_new: bool,
}

/// Interned set of `(program point, program state)` pairs and an implicit
/// notion of "already explored", keyed by value-equality of the pair. The
/// worklist (not this structure) carries the actual traversal order.
#[derive(Default)]
pub struct ExplodedGraph {
    nodes: HashMap<(ProgramPoint, ProgramState), ()>,
}

impl ExplodedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a node for `(point, state)`. If the pair was already present
    /// the returned node has `is_new = false`; otherwise it is inserted and
    /// returned with `is_new = true`.
    pub fn get_node(&mut self, point: ProgramPoint, state: ProgramState) -> Node {
        let key = (point, state.clone());
        if self.nodes.contains_key(&key) {
            Node { point, state, is_new: false }
        } else {
            self.nodes.insert(key, ());
            Node { point, state, is_new: true }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
