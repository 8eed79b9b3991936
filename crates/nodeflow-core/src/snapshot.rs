//! Immutable views of the graph.
//!
//! A [`Snapshot`] holds its collections behind `Arc<[T]>`. Cloning is two
//! reference-count bumps, and nothing can mutate a snapshot once it exists, so
//! subscribers may keep old ones around freely. The store swaps in a new `Arc`
//! only when a collection actually changes. That lets consumers detect change
//! by identity ([`Snapshot::content_eq`]) instead of comparing contents.

use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::error::GraphError;
use crate::model::{Edge, EdgeId, Node, NodeId};

/// The node and edge collections at one instant.
#[derive(Clone, Debug)]
pub struct Snapshot {
    nodes: Arc<[Node]>,
    edges: Arc<[Edge]>,
}

impl Snapshot {
    /// Wraps the given collections.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: nodes.into(),
            edges: edges.into(),
        }
    }

    /// Nodes in insertion order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == *id)
    }

    /// Looks up a node, reporting a missing id as an error.
    pub fn require_node(&self, id: &NodeId) -> Result<&Node, GraphError> {
        self.node(id.as_str())
            .ok_or_else(|| GraphError::unknown_node(id))
    }

    /// Looks up an edge, reporting a missing id as an error.
    pub fn require_edge(&self, id: &EdgeId) -> Result<&Edge, GraphError> {
        self.edge(id.as_str())
            .ok_or_else(|| GraphError::unknown_edge(id))
    }

    /// Node ids in order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    /// Edges with at least one endpoint missing from the node collection.
    ///
    /// Removing a node leaves its edges in place; they stay inert until the
    /// renderer removes them.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter().filter(move |e| {
            self.node(e.source.as_str()).is_none() || self.node(e.target.as_str()).is_none()
        })
    }

    /// `true` if both snapshots share the same node and edge allocations.
    ///
    /// This is the "did anything change" test: the store only allocates a
    /// new collection when its content changes.
    pub fn content_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes) && Arc::ptr_eq(&self.edges, &other.edges)
    }

    pub(crate) fn nodes_arc(&self) -> &Arc<[Node]> {
        &self.nodes
    }

    pub(crate) fn edges_arc(&self) -> &Arc<[Edge]> {
        &self.edges
    }

    pub(crate) fn from_parts(nodes: Arc<[Node]>, edges: Arc<[Edge]>) -> Self {
        Self { nodes, edges }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Compares contents, not identity.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Snapshot", 2)?;
        s.serialize_field("nodes", &*self.nodes)?;
        s.serialize_field("edges", &*self.edges)?;
        s.end()
    }
}
