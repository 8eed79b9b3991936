//! The signal engine seam.
//!
//! The editor never talks to audio hardware directly. It hands each new
//! [`Snapshot`] to a [`SignalEngine`], which is responsible for making its own
//! processing graph match. Implementations are called from one thread at a
//! time (the bridge serializes calls), so they need not be reentrant.

use nodeflow_core::{NodeId, Snapshot};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by a [`SignalEngine`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The engine has no processor for this node type.
    #[error("node '{id}' has unsupported type '{node_type}'")]
    UnsupportedNode {
        /// Offending node.
        id: NodeId,
        /// Its type key.
        node_type: String,
    },

    /// A parameter value the engine cannot interpret.
    #[error("node '{id}' has invalid parameter '{key}'")]
    InvalidParam {
        /// Owning node.
        id: NodeId,
        /// Parameter key in the node's data.
        key: String,
    },

    /// The engine refused the update for its own reasons.
    #[error("engine rejected update: {0}")]
    Rejected(String),

    /// The processing context has been closed.
    #[error("processing context unavailable")]
    ContextUnavailable,
}

/// Lifecycle of the engine's processing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Created but not producing sound. Hosts start here until the first
    /// user interaction.
    #[default]
    Suspended,
    /// Producing sound.
    Running,
    /// Torn down. No further calls succeed.
    Closed,
}

/// An external signal-processing graph kept in step with the editor.
pub trait SignalEngine {
    /// Makes the engine's graph match `snapshot`.
    ///
    /// On error the engine must keep its previous graph; a partial apply is
    /// not allowed.
    fn reconcile(&mut self, snapshot: &Snapshot) -> Result<(), EngineError>;

    /// Resumes a suspended processing context. Calling it while running is a
    /// no-op.
    fn resume(&mut self) -> Result<(), EngineError>;
}

impl<E: SignalEngine + ?Sized> SignalEngine for Box<E> {
    fn reconcile(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        (**self).reconcile(snapshot)
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        (**self).resume()
    }
}
