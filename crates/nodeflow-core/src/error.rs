//! Error types for graph mutations.

use core::fmt;

use thiserror::Error;

use crate::model::{EdgeId, NodeId};

/// Which collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// The node collection.
    Node,
    /// The edge collection.
    Edge,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemKind::Node => "node",
            ItemKind::Edge => "edge",
        })
    }
}

/// Errors reported by graph operations.
///
/// Change-list application never returns these: unknown ids are ignored and
/// malformed items are dropped one by one so an interactive editor keeps
/// responding. Named operations that can refuse a request
/// ([`insert_node`](crate::GraphStore::insert_node),
/// [`on_connect`](crate::GraphStore::on_connect)) report why, and leave state
/// untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// An id that does not exist in the snapshot.
    #[error("unknown {kind} id '{id}'")]
    InvalidReference {
        /// Collection that was searched.
        kind: ItemKind,
        /// The missing id.
        id: String,
    },

    /// A node with this id already exists.
    #[error("node id '{0}' already exists")]
    DuplicateNodeId(NodeId),

    /// An edge with this id or endpoint tuple already exists.
    #[error("edge '{0}' already exists")]
    DuplicateEdge(EdgeId),

    /// A change item is missing required fields or carries invalid values.
    #[error("malformed change: {0}")]
    MalformedChange(String),
}

impl GraphError {
    /// Create an unknown-node error.
    pub fn unknown_node(id: &NodeId) -> Self {
        GraphError::InvalidReference {
            kind: ItemKind::Node,
            id: id.to_string(),
        }
    }

    /// Create an unknown-edge error.
    pub fn unknown_edge(id: &EdgeId) -> Self {
        GraphError::InvalidReference {
            kind: ItemKind::Edge,
            id: id.to_string(),
        }
    }
}
