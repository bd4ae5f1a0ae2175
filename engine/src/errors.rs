use thiserror::Error;

use crate::core::NodeId;

/// The three error kinds of spec §7. Bounded-abort variants are expected
/// failures on pathological inputs: the driver catches them per procedure
/// and continues. `Internal` is an unrecoverable bug (unexpected tree kind
/// reaching a CFG block, stack underflow, an unknown constraint kind) and
/// is surfaced separately so a driver can tell the two apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("procedure {procedure}: maximum step count exceeded")]
    MaximumStepsReached { procedure: String },

    #[error("procedure {procedure}: exploded graph too big")]
    ExplodedGraphTooBig { procedure: String },

    #[error("internal invariant violation: {message}")]
    Internal { message: String, node: Option<NodeId> },
}

impl EngineError {
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::Internal {
            message: message.into(),
            node: None,
        }
    }

    pub fn internal_at(message: impl Into<String>, node: NodeId) -> Self {
        EngineError::Internal {
            message: message.into(),
            node: Some(node),
        }
    }
}
