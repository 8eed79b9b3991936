//! Nodeflow Core - reactive state for a node-graph editor
//!
//! This crate holds the canonical state of a visual patch editor (nodes and
//! the edges between them) and the rules for changing it. A renderer draws
//! from it, and a signal engine mirrors it (see `nodeflow-sync`).
//!
//! # Core Abstractions
//!
//! ## State
//!
//! - [`GraphStore`] - Owns the current [`Snapshot`], applies mutations, notifies subscribers
//! - [`Snapshot`] - Immutable `(nodes, edges)` pair; identity comparison detects change
//!
//! ## Mutation Protocol
//!
//! - [`NodeChange`] / [`EdgeChange`] - Tagged change-list items emitted by the renderer
//! - [`apply_node_changes`] / [`apply_edge_changes`] - Pure reducers over a collection
//! - [`Connection`] / [`add_edge`] - Idempotent edge creation with deterministic ids
//!
//! ## Layout
//!
//! - [`LayoutEngine`] - Spreads nodes across the measured container
//! - [`distribute`] - Evenly spaced slot centres
//!
//! ## Initialization
//!
//! - [`NodeSeed`] / [`EdgeSeed`] - Partial items supplied by the host
//! - [`DefaultsCatalog`] - Per-type default data, consulted once per seed
//!
//! # Example
//!
//! ```rust
//! use nodeflow_core::{Dimensions, EmptyCatalog, GraphStore, NodeSeed};
//!
//! let seeds = (1..=3).map(|i| NodeSeed::new(format!("n{i}"), "osc"));
//! let mut store = GraphStore::new(seeds, vec![], &EmptyCatalog);
//!
//! let snapshot = store.distribute_nodes(Dimensions::new(900.0, 400.0));
//! assert!(snapshot.nodes().iter().all(|n| n.position.y == 100.0));
//! ```

pub mod catalog;
pub mod change;
pub mod connection;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod snapshot;
pub mod store;

pub use catalog::{DefaultsCatalog, EmptyCatalog};
pub use change::{
    Decoded, EdgeChange, NodeChange, NodeUpdate, apply_edge_changes, apply_node_changes,
    decode_edge_changes, decode_node_changes,
};
pub use connection::{Connection, add_edge, edge_id};
pub use error::{GraphError, ItemKind};
pub use geometry::distribute;
pub use layout::{LayoutConfig, LayoutEngine, Overflow};
pub use model::{
    Dimensions, Edge, EdgeId, EdgeSeed, Node, NodeData, NodeId, NodeSeed, PartialPosition,
    Position,
};
pub use snapshot::Snapshot;
pub use store::{GraphStore, SubscriptionId};
