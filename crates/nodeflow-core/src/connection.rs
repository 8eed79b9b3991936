//! Connection requests and deterministic edge naming.
//!
//! The renderer reports a finished drag between two handles as a
//! [`Connection`]. Turning it into an [`Edge`] must be idempotent: the same
//! endpoint tuple always produces the same [`EdgeId`], so a repeated request is
//! caught by a plain id lookup.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::model::{Edge, EdgeId, NodeData, NodeId};

/// A request to connect two node handles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Node the signal leaves.
    pub source: NodeId,
    /// Node the signal enters.
    pub target: NodeId,
    /// Output handle on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Extra parameters copied onto the new edge.
    #[serde(flatten)]
    pub params: NodeData,
}

impl Connection {
    /// Connects `source` to `target` without handles.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Sets both handles.
    pub fn with_handles(
        mut self,
        source_handle: Option<impl Into<String>>,
        target_handle: Option<impl Into<String>>,
    ) -> Self {
        self.source_handle = source_handle.map(Into::into);
        self.target_handle = target_handle.map(Into::into);
        self
    }

    /// The id an edge built from this connection will carry.
    pub fn edge_id(&self) -> EdgeId {
        edge_id(
            &self.source,
            self.source_handle.as_deref(),
            &self.target,
            self.target_handle.as_deref(),
        )
    }

    /// Checks that both endpoints are named.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.source.is_empty() || self.target.is_empty() {
            return Err(GraphError::MalformedChange(
                "connection needs both a source and a target".into(),
            ));
        }
        Ok(())
    }

    /// Builds the edge for this connection.
    pub fn into_edge(self) -> Edge {
        let id = self.edge_id();
        Edge {
            id,
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
            selected: false,
            params: self.params,
        }
    }
}

/// Derives the id of the edge joining the given endpoint tuple.
///
/// The format is `edge__{source}[.{handle}]->{target}[.{handle}]`. Each
/// component has `%`, `.` and `>` percent-encoded, so the separators only
/// ever come from the format and distinct tuples never share an id.
///
/// ```
/// use nodeflow_core::edge_id;
///
/// let plain = edge_id(&"a".into(), None, &"b.c".into(), None);
/// let handled = edge_id(&"a".into(), None, &"b".into(), Some("c"));
/// assert_eq!(plain.as_str(), "edge__a->b%2Ec");
/// assert_eq!(handled.as_str(), "edge__a->b.c");
/// ```
pub fn edge_id(
    source: &NodeId,
    source_handle: Option<&str>,
    target: &NodeId,
    target_handle: Option<&str>,
) -> EdgeId {
    let mut id = String::from("edge__");
    push_endpoint(&mut id, source.as_str(), source_handle);
    id.push_str("->");
    push_endpoint(&mut id, target.as_str(), target_handle);
    EdgeId::from(id)
}

fn push_endpoint(out: &mut String, node: &str, handle: Option<&str>) {
    push_escaped(out, node);
    if let Some(h) = handle {
        out.push('.');
        push_escaped(out, h);
    }
}

fn push_escaped(out: &mut String, component: &str) {
    for c in component.chars() {
        match c {
            '%' => out.push_str("%25"),
            '.' => out.push_str("%2E"),
            '>' => out.push_str("%3E"),
            c => out.push(c),
        }
    }
}

/// Appends the edge for `connection` to `edges`, returning the new collection.
///
/// Refuses a connection whose id or endpoint tuple is already present, so
/// repeated requests leave exactly one edge.
pub fn add_edge(connection: Connection, edges: &[Edge]) -> Result<Vec<Edge>, GraphError> {
    connection.validate()?;
    let edge = connection.into_edge();
    if edges
        .iter()
        .any(|e| e.id == edge.id || e.same_endpoints(&edge))
    {
        return Err(GraphError::DuplicateEdge(edge.id));
    }
    let mut out = Vec::with_capacity(edges.len() + 1);
    out.extend_from_slice(edges);
    out.push(edge);
    Ok(out)
}
