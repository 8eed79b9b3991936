//! Keeps an external signal engine in step with the nodeflow graph.
//!
//! The editor's [`GraphStore`](nodeflow_core::GraphStore) is the source of
//! truth; an audio engine builds its processing graph from it. This crate
//! sits between the two:
//!
//! - [`SignalEngine`] - the seam an engine implements
//! - [`SyncBridge`] - subscribes to the store, forwards each distinct
//!   snapshot, coalesces bursts, and records failures
//! - [`InteractionGate`] - one-shot latch that resumes the engine on the
//!   first user interaction
//! - [`MirrorEngine`] - in-memory engine for headless hosts and tests
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nodeflow_core::{Connection, GraphStore, NodeSeed};
//! use nodeflow_registry::NodeRegistry;
//! use nodeflow_sync::{MirrorEngine, SyncBridge};
//!
//! let registry = NodeRegistry::new();
//! let mut store = GraphStore::new(
//!     vec![NodeSeed::new("osc", "osc"), NodeSeed::new("out", "out")],
//!     vec![],
//!     &registry,
//! );
//!
//! let engine = MirrorEngine::from_registry(&registry);
//! let mirror = engine.handle();
//! let bridge = Arc::new(SyncBridge::new(engine));
//! bridge.attach(&mut store);
//!
//! store.on_connect(Connection::new("osc", "out")).unwrap();
//! assert_eq!(mirror.connection_count(), 1);
//! ```

pub mod bridge;
pub mod engine;
pub mod gate;
pub mod mirror;

pub use bridge::{SyncBridge, SyncStats};
pub use engine::{EngineError, RunState, SignalEngine};
pub use gate::InteractionGate;
pub use mirror::{MirrorConnection, MirrorEngine, MirrorHandle, MirrorState, MirrorVoice};
