//! The editor session.
//!
//! An [`EditorSession`] is built once when the editor mounts and owns the
//! store for its lifetime. It wires up the pieces in a fixed order: the
//! store is seeded, the sync bridge (if any) subscribes first and receives
//! the initial snapshot, and the interaction gate is armed. After that every
//! input goes through the session: container measurements re-run layout,
//! the first interaction resumes the engine, and renderer callbacks become
//! store mutations.

use std::sync::Arc;

use nodeflow_config::{EditorConfig, Patch};
use nodeflow_core::{
    Connection, DefaultsCatalog, Dimensions, EdgeChange, EdgeSeed, GraphError, GraphStore, Node,
    NodeChange, NodeData, NodeId, NodeSeed, Snapshot, SubscriptionId,
};
use nodeflow_sync::{EngineError, SignalEngine, SyncBridge, SyncStats};
use thiserror::Error;

use crate::events::{EventReceiver, HostEvent};

/// Initial graph handed to the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInit {
    /// Node seeds.
    pub nodes: Vec<NodeSeed>,
    /// Edge seeds.
    pub edges: Vec<EdgeSeed>,
}

impl SessionInit {
    /// Seeds with no edges.
    pub fn nodes(nodes: impl IntoIterator<Item = NodeSeed>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            edges: Vec::new(),
        }
    }

    /// Adds edge seeds.
    pub fn with_edges(mut self, edges: impl IntoIterator<Item = EdgeSeed>) -> Self {
        self.edges.extend(edges);
        self
    }
}

impl From<Patch> for SessionInit {
    fn from(patch: Patch) -> Self {
        Self {
            nodes: patch.nodes,
            edges: patch.edges,
        }
    }
}

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The store refused the mutation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The engine refused a call.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Owns the store, the layout inputs, and the engine bridge.
pub struct EditorSession {
    store: GraphStore,
    bridge: Option<Arc<SyncBridge>>,
    dimensions: Option<Dimensions>,
    config: EditorConfig,
}

impl EditorSession {
    /// A session with no engine.
    pub fn new(init: SessionInit, catalog: &dyn DefaultsCatalog, config: EditorConfig) -> Self {
        let store =
            GraphStore::new(init.nodes, init.edges, catalog).with_layout(config.layout_engine());
        tracing::debug!(
            nodes = store.nodes().len(),
            edges = store.edges().len(),
            "editor session created"
        );
        Self {
            store,
            bridge: None,
            dimensions: None,
            config,
        }
    }

    /// A session that keeps `engine` in step with the store.
    ///
    /// The bridge is the first subscriber and receives the initial snapshot
    /// before this returns. With `sync.enabled = false` in `config` the
    /// bridge is created but not subscribed; call [`sync`](Self::sync) to
    /// forward by hand. Either way the interaction gate is armed.
    pub fn with_engine(
        init: SessionInit,
        catalog: &dyn DefaultsCatalog,
        config: EditorConfig,
        engine: impl SignalEngine + Send + 'static,
    ) -> Self {
        let mut session = Self::new(init, catalog, config);
        let bridge = Arc::new(SyncBridge::new(engine));
        if config.sync.enabled {
            bridge.attach(&mut session.store);
        } else {
            tracing::debug!("sync disabled, bridge not subscribed");
        }
        bridge.arm_interaction();
        session.bridge = Some(bridge);
        session
    }

    // --- Observation ---

    /// The store.
    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Settings the session was built with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Last delivered container size.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// The engine bridge, if the session has an engine.
    pub fn bridge(&self) -> Option<&Arc<SyncBridge>> {
        self.bridge.as_ref()
    }

    /// Bridge counters, if the session has an engine.
    pub fn sync_stats(&self) -> Option<SyncStats> {
        self.bridge.as_ref().map(|b| b.stats())
    }

    /// Registers a renderer callback. Runs after the bridge.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&Snapshot) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Removes a renderer callback.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // --- Host inputs ---

    /// The container was measured. Lays the nodes out for the new size.
    ///
    /// Negative or non-finite sizes are treated as zero.
    pub fn on_resize(&mut self, dimensions: Dimensions) -> Snapshot {
        let dimensions = dimensions.sanitized();
        self.dimensions = Some(dimensions);
        self.store.distribute_nodes(dimensions)
    }

    /// Re-runs layout with the last delivered size. Does nothing before the
    /// first measurement.
    pub fn relayout(&mut self) -> Option<Snapshot> {
        let dimensions = self.dimensions?;
        Some(self.store.distribute_nodes(dimensions))
    }

    /// The user interacted with the editor.
    ///
    /// Returns `Ok(true)` for the one interaction that resumed the engine.
    pub fn on_interaction(&self) -> Result<bool, EditorError> {
        match &self.bridge {
            Some(bridge) => Ok(bridge.on_interaction()?),
            None => Ok(false),
        }
    }

    /// Forwards the current snapshot to the engine now.
    ///
    /// Only needed when sync is disabled; the bridge ignores a snapshot it
    /// has already seen.
    pub fn sync(&self) {
        if let Some(bridge) = &self.bridge {
            bridge.observe(&self.store.snapshot());
        }
    }

    // --- Mutations ---

    /// Appends a node. An existing id is refused.
    pub fn insert_node(&mut self, node: Node) -> Result<Snapshot, EditorError> {
        Ok(self.store.insert_node(node)?)
    }

    /// Shallow-merges `data` into a node's data.
    pub fn update_node(&mut self, id: impl Into<NodeId>, data: NodeData) -> Snapshot {
        self.store.update_node(id, data)
    }

    /// Removes a node, leaving its edges dangling.
    pub fn remove_node(&mut self, id: impl Into<NodeId>) -> Snapshot {
        self.store.remove_node(id)
    }

    /// Applies a renderer node change-list.
    pub fn update_nodes(&mut self, changes: &[NodeChange]) -> Snapshot {
        self.store.update_nodes(changes)
    }

    /// Applies a renderer edge change-list.
    pub fn update_edges(&mut self, changes: &[EdgeChange]) -> Snapshot {
        self.store.update_edges(changes)
    }

    /// Adds the edge for a finished connection drag.
    pub fn on_connect(&mut self, connection: Connection) -> Result<Snapshot, EditorError> {
        Ok(self.store.on_connect(connection)?)
    }

    // --- Event loop ---

    /// Handles one host event.
    pub fn dispatch(&mut self, event: HostEvent) -> Result<(), EditorError> {
        match event {
            HostEvent::Resize(dimensions) => {
                self.on_resize(dimensions);
            }
            HostEvent::Interaction => {
                self.on_interaction()?;
            }
            HostEvent::NodeChanges(changes) => {
                self.update_nodes(&changes);
            }
            HostEvent::EdgeChanges(changes) => {
                self.update_edges(&changes);
            }
            HostEvent::Connect(connection) => {
                self.on_connect(connection)?;
            }
            HostEvent::InsertNode(node) => {
                self.insert_node(node)?;
            }
            HostEvent::UpdateNode { id, data } => {
                self.update_node(id, data);
            }
            HostEvent::RemoveNode(id) => {
                self.remove_node(id);
            }
        }
        Ok(())
    }

    /// Drains every queued event in FIFO order and returns how many were
    /// handled.
    ///
    /// A failing event is logged and skipped; later events still run.
    pub fn pump(&mut self, events: &EventReceiver) -> usize {
        let mut handled = 0;
        while let Some(event) = events.try_next() {
            if let Err(err) = self.dispatch(event) {
                tracing::warn!(%err, "host event failed");
            }
            handled += 1;
        }
        handled
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("store", &self.store)
            .field("bridge", &self.bridge)
            .field("dimensions", &self.dimensions)
            .field("config", &self.config)
            .finish()
    }
}
