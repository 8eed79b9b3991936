//! The graph store: single source of truth for editor state.
//!
//! [`GraphStore`] owns the current [`Snapshot`] and is the only thing allowed
//! to replace it. Every named operation is built from the change-list reducers
//! in [`crate::change`], so the renderer's edits and the store's own
//! operations (layout, insert, connect) go through one code path.
//!
//! After a mutation completes, subscribers are called synchronously in
//! registration order with the new snapshot. A mutation that leaves the
//! content unchanged (unknown id, same positions, rejected insert) publishes
//! nothing, so subscribers see each distinct snapshot exactly once.
//!
//! ```
//! use nodeflow_core::{Connection, Dimensions, EmptyCatalog, GraphStore, NodeSeed};
//!
//! let mut store = GraphStore::new(
//!     vec![NodeSeed::new("osc", "osc"), NodeSeed::new("out", "out")],
//!     vec![],
//!     &EmptyCatalog,
//! );
//! store.distribute_nodes(Dimensions::new(900.0, 400.0));
//! store.on_connect(Connection::new("osc", "out")).unwrap();
//! assert_eq!(store.edges().len(), 1);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::DefaultsCatalog;
use crate::change::{EdgeChange, NodeChange, apply_edge_changes, apply_node_changes};
use crate::connection::{Connection, add_edge};
use crate::error::GraphError;
use crate::layout::LayoutEngine;
use crate::model::{Dimensions, Edge, EdgeId, EdgeSeed, Node, NodeData, NodeId, NodeSeed};
use crate::snapshot::Snapshot;

/// Handle returned by [`GraphStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Snapshot) + Send>;

struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
}

/// Canonical node/edge state with synchronous change notification.
pub struct GraphStore {
    snapshot: Snapshot,
    layout: LayoutEngine,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
    version: u64,
}

impl GraphStore {
    /// Builds the store from initial seeds.
    ///
    /// Each node seed is completed against `catalog` (defaults first, seed
    /// data on top) and placed at its seed position, or the origin. Seeds
    /// whose id repeats an earlier one, or is empty, are dropped with a
    /// warning so the id-uniqueness invariant holds from the start.
    pub fn new(
        nodes: impl IntoIterator<Item = NodeSeed>,
        edges: impl IntoIterator<Item = EdgeSeed>,
        catalog: &dyn DefaultsCatalog,
    ) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|seed| {
                if seed.id.is_empty() {
                    tracing::warn!(node_type = %seed.node_type, "dropping node seed without id");
                    return false;
                }
                if !seen.insert(seed.id.clone()) {
                    tracing::warn!(id = %seed.id, "dropping duplicate node seed");
                    return false;
                }
                true
            })
            .map(|seed| {
                let defaults = catalog.defaults(&seed.node_type);
                if defaults.is_none() {
                    tracing::debug!(id = %seed.id, node_type = %seed.node_type, "no defaults for node type");
                }
                seed.into_node(defaults)
            })
            .collect();

        let mut seen = HashSet::new();
        let edges: Vec<Edge> = edges
            .into_iter()
            .map(EdgeSeed::into_edge)
            .filter(|edge| {
                let fresh = seen.insert(edge.id.clone());
                if !fresh {
                    tracing::warn!(id = %edge.id, "dropping duplicate edge seed");
                }
                fresh
            })
            .collect();

        Self {
            snapshot: Snapshot::new(nodes, edges),
            layout: LayoutEngine::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
            version: 0,
        }
    }

    /// Replaces the layout engine used by [`distribute_nodes`](Self::distribute_nodes).
    pub fn with_layout(mut self, layout: LayoutEngine) -> Self {
        self.layout = layout;
        self
    }

    /// The layout engine in use.
    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    // --- Observation ---

    /// The current snapshot (cheap clone).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Current nodes.
    pub fn nodes(&self) -> &[Node] {
        self.snapshot.nodes()
    }

    /// Current edges.
    pub fn edges(&self) -> &[Edge] {
        self.snapshot.edges()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.snapshot.node(id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.snapshot.edge(id)
    }

    /// Edges whose source or target node no longer exists.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.snapshot.dangling_edges()
    }

    /// Number of snapshots published since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers `callback` to run after every published change.
    ///
    /// Callbacks run synchronously, in registration order, once the mutation
    /// has completed. They are not called for the current snapshot.
    pub fn subscribe(&mut self, callback: impl FnMut(&Snapshot) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Removes a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    // --- Mutations ---

    /// Positions every node from the container dimensions.
    ///
    /// The layout is applied as a list of `position` changes, so every other
    /// node field is preserved. Calling again with the same dimensions and
    /// node set computes the same positions and publishes nothing.
    pub fn distribute_nodes(&mut self, dimensions: Dimensions) -> Snapshot {
        let ids = self.snapshot.node_ids();
        let changes = self.layout.position_changes(&ids, dimensions);
        self.update_nodes(&changes)
    }

    /// Appends a node.
    ///
    /// An id that already exists is refused with
    /// [`GraphError::DuplicateNodeId`]; the existing node is not overwritten
    /// and nothing is published.
    pub fn insert_node(&mut self, node: Node) -> Result<Snapshot, GraphError> {
        let change = NodeChange::add(node);
        change.validate()?;
        if self.snapshot.node(change.id().as_str()).is_some() {
            tracing::warn!(id = %change.id(), "insert rejected: node id already exists");
            return Err(GraphError::DuplicateNodeId(change.id().clone()));
        }
        Ok(self.update_nodes(&[change]))
    }

    /// Shallow-merges `data` into a node's data. Position and type are untouched.
    ///
    /// Unknown ids are ignored.
    pub fn update_node(&mut self, id: impl Into<NodeId>, data: NodeData) -> Snapshot {
        self.update_nodes(&[NodeChange::update_data(id, data)])
    }

    /// Removes a node.
    ///
    /// Edges that reference it are kept and become dangling; see
    /// [`Snapshot::dangling_edges`].
    pub fn remove_node(&mut self, id: impl Into<NodeId>) -> Snapshot {
        self.update_nodes(&[NodeChange::remove(id)])
    }

    /// Removes an edge. Unknown ids are ignored.
    pub fn remove_edge(&mut self, id: impl Into<EdgeId>) -> Snapshot {
        self.update_edges(&[EdgeChange::remove(id)])
    }

    /// Applies a renderer change-list to the nodes.
    pub fn update_nodes(&mut self, changes: &[NodeChange]) -> Snapshot {
        let nodes = apply_node_changes(changes, self.snapshot.nodes());
        self.replace_nodes(nodes)
    }

    /// Applies a renderer change-list to the edges.
    pub fn update_edges(&mut self, changes: &[EdgeChange]) -> Snapshot {
        let edges = apply_edge_changes(changes, self.snapshot.edges());
        self.replace_edges(edges)
    }

    /// Adds the edge for a finished connection drag.
    ///
    /// The edge id is derived from the endpoint tuple, and a tuple that is
    /// already connected is refused with [`GraphError::DuplicateEdge`].
    pub fn on_connect(&mut self, connection: Connection) -> Result<Snapshot, GraphError> {
        let edges = add_edge(connection, self.snapshot.edges()).inspect_err(|err| {
            tracing::debug!(%err, "connection refused");
        })?;
        Ok(self.replace_edges(edges))
    }

    fn replace_nodes(&mut self, nodes: Vec<Node>) -> Snapshot {
        if nodes.as_slice() != self.snapshot.nodes() {
            let edges = Arc::clone(self.snapshot.edges_arc());
            self.publish(Snapshot::from_parts(nodes.into(), edges));
        }
        self.snapshot.clone()
    }

    fn replace_edges(&mut self, edges: Vec<Edge>) -> Snapshot {
        if edges.as_slice() != self.snapshot.edges() {
            let nodes = Arc::clone(self.snapshot.nodes_arc());
            self.publish(Snapshot::from_parts(nodes, edges.into()));
        }
        self.snapshot.clone()
    }

    fn publish(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.version += 1;
        tracing::trace!(
            version = self.version,
            nodes = self.snapshot.nodes().len(),
            edges = self.snapshot.edges().len(),
            "snapshot published"
        );
        for subscriber in &mut self.subscribers {
            (subscriber.callback)(&self.snapshot);
        }
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("snapshot", &self.snapshot)
            .field("layout", &self.layout)
            .field("subscribers", &self.subscribers.len())
            .field("version", &self.version)
            .finish()
    }
}
