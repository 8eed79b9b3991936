//! Lookup of per-type default data.

use std::collections::HashMap;

use crate::model::NodeData;

/// Maps a node type to its baseline data payload.
///
/// The store consults the catalog once per seed node, when it is built.
/// Nodes added later (through [`insert_node`](crate::GraphStore::insert_node)
/// or an `add` change) arrive fully formed and are not completed again.
pub trait DefaultsCatalog {
    /// Default data for `node_type`, or `None` for an unknown type.
    fn defaults(&self, node_type: &str) -> Option<NodeData>;
}

/// A catalog with no entries; seeds keep only their own data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCatalog;

impl DefaultsCatalog for EmptyCatalog {
    fn defaults(&self, _node_type: &str) -> Option<NodeData> {
        None
    }
}

impl DefaultsCatalog for HashMap<String, NodeData> {
    fn defaults(&self, node_type: &str) -> Option<NodeData> {
        self.get(node_type).cloned()
    }
}

impl<C: DefaultsCatalog + ?Sized> DefaultsCatalog for &C {
    fn defaults(&self, node_type: &str) -> Option<NodeData> {
        (**self).defaults(node_type)
    }
}

impl<C: DefaultsCatalog + ?Sized> DefaultsCatalog for std::sync::Arc<C> {
    fn defaults(&self, node_type: &str) -> Option<NodeData> {
        (**self).defaults(node_type)
    }
}
