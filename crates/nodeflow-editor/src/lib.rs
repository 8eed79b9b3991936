//! Nodeflow editor session.
//!
//! Ties the graph store, automatic layout, and the engine bridge together
//! behind one object a host embeds:
//!
//! - [`EditorSession`] - built once per editor; owns the store
//! - [`HostEvent`] / [`event_channel`] - inputs from other threads, drained
//!   in order by [`EditorSession::pump`]
//!
//! # Example
//!
//! ```rust
//! use nodeflow_config::EditorConfig;
//! use nodeflow_core::NodeSeed;
//! use nodeflow_editor::{EditorSession, SessionInit, event_channel};
//! use nodeflow_registry::NodeRegistry;
//! use nodeflow_sync::MirrorEngine;
//!
//! let registry = NodeRegistry::new();
//! let engine = MirrorEngine::from_registry(&registry);
//! let mirror = engine.handle();
//!
//! let init = SessionInit::nodes([NodeSeed::new("osc", "osc"), NodeSeed::new("out", "out")]);
//! let mut session = EditorSession::with_engine(init, &registry, EditorConfig::default(), engine);
//!
//! let (events, queue) = event_channel();
//! events.resize(900.0, 400.0);
//! events.interaction();
//! assert_eq!(session.pump(&queue), 2);
//! assert_eq!(mirror.voice_count(), 2);
//! ```

pub mod events;
pub mod session;

pub use events::{EventReceiver, EventSender, HostEvent, event_channel};
pub use session::{EditorError, EditorSession, SessionInit};
