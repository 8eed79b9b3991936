//! In-memory reference engine.
//!
//! [`MirrorEngine`] keeps a plain description of the processing graph it
//! would build: one voice per node, one connection per live edge. Headless
//! hosts (the CLI, tests) use it in place of a real audio backend, and a real
//! backend can diff against its state.
//!
//! Reconcile is all-or-nothing. The new mirror is built off to the side and
//! only swapped in once every node has been accepted, so a rejected snapshot
//! leaves the previous mirror intact.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use nodeflow_core::{Edge, EdgeId, Node, NodeId, Snapshot};
use nodeflow_registry::NodeRegistry;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::engine::{EngineError, RunState, SignalEngine};

/// One node as the engine sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MirrorVoice {
    /// Node type.
    pub kind: String,
    /// Numeric parameters. Booleans map to `0.0` / `1.0`.
    pub params: BTreeMap<String, f64>,
    /// Enumerated settings such as waveform or filter mode.
    pub settings: BTreeMap<String, String>,
}

/// One live edge as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorConnection {
    /// Edge id.
    pub id: EdgeId,
    /// Source voice.
    pub source: NodeId,
    /// Target voice.
    pub target: NodeId,
    /// Output handle, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Input handle, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Everything the mirror currently holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MirrorState {
    /// Processing context state.
    pub run_state: RunState,
    /// Voices by node id.
    pub voices: BTreeMap<NodeId, MirrorVoice>,
    /// Connections in edge order.
    pub connections: Vec<MirrorConnection>,
    /// Successful reconciles so far.
    pub reconciles: u64,
}

/// Read-only view of a [`MirrorEngine`] that stays valid after the engine
/// has been moved into a bridge.
#[derive(Debug, Clone)]
pub struct MirrorHandle {
    shared: Arc<RwLock<MirrorState>>,
}

impl MirrorHandle {
    /// A copy of the current state.
    pub fn state(&self) -> MirrorState {
        self.shared.read().clone()
    }

    /// Current run state.
    pub fn run_state(&self) -> RunState {
        self.shared.read().run_state
    }

    /// A voice by node id.
    pub fn voice(&self, id: &str) -> Option<MirrorVoice> {
        self.shared.read().voices.get(&NodeId::from(id)).cloned()
    }

    /// Number of voices.
    pub fn voice_count(&self) -> usize {
        self.shared.read().voices.len()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.shared.read().connections.len()
    }
}

/// Engine that mirrors the editor graph in memory.
#[derive(Debug)]
pub struct MirrorEngine {
    supported: BTreeSet<String>,
    shared: Arc<RwLock<MirrorState>>,
}

impl MirrorEngine {
    /// An engine that accepts the given node types.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: kinds.into_iter().map(Into::into).collect(),
            shared: Arc::default(),
        }
    }

    /// An engine that accepts every type in `registry`.
    pub fn from_registry(registry: &NodeRegistry) -> Self {
        Self::new(registry.ids())
    }

    /// A handle for inspecting the mirror.
    pub fn handle(&self) -> MirrorHandle {
        MirrorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// `true` if `kind` has a processor.
    pub fn supports(&self, kind: &str) -> bool {
        self.supported.contains(kind)
    }

    /// Tears down the context. Later calls fail with
    /// [`EngineError::ContextUnavailable`].
    pub fn close(&mut self) {
        self.shared.write().run_state = RunState::Closed;
    }

    fn build_voice(&self, node: &Node) -> Result<MirrorVoice, EngineError> {
        if !self.supports(&node.node_type) {
            return Err(EngineError::UnsupportedNode {
                id: node.id.clone(),
                node_type: node.node_type.clone(),
            });
        }

        let mut voice = MirrorVoice {
            kind: node.node_type.clone(),
            ..MirrorVoice::default()
        };
        for (key, value) in &node.data {
            let invalid = || EngineError::InvalidParam {
                id: node.id.clone(),
                key: key.clone(),
            };
            match value {
                Value::Number(n) => {
                    let v = n.as_f64().filter(|v| v.is_finite()).ok_or_else(invalid)?;
                    voice.params.insert(key.clone(), v);
                }
                Value::Bool(b) => {
                    voice.params.insert(key.clone(), if *b { 1.0 } else { 0.0 });
                }
                Value::String(s) => {
                    voice.settings.insert(key.clone(), s.clone());
                }
                Value::Null | Value::Array(_) | Value::Object(_) => return Err(invalid()),
            }
        }
        Ok(voice)
    }

    fn connection(edge: &Edge) -> MirrorConnection {
        MirrorConnection {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
        }
    }
}

impl SignalEngine for MirrorEngine {
    fn reconcile(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        if self.shared.read().run_state == RunState::Closed {
            return Err(EngineError::ContextUnavailable);
        }

        let voices = snapshot
            .nodes()
            .iter()
            .map(|node| self.build_voice(node).map(|voice| (node.id.clone(), voice)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let connections = snapshot
            .edges()
            .iter()
            .filter(|edge| {
                let live = voices.contains_key(&edge.source) && voices.contains_key(&edge.target);
                if !live {
                    tracing::debug!(id = %edge.id, "skipping dangling edge");
                }
                live
            })
            .map(Self::connection)
            .collect();

        let mut state = self.shared.write();
        state.voices = voices;
        state.connections = connections;
        state.reconciles += 1;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let mut state = self.shared.write();
        match state.run_state {
            RunState::Closed => Err(EngineError::ContextUnavailable),
            RunState::Running => Ok(()),
            RunState::Suspended => {
                state.run_state = RunState::Running;
                tracing::info!("mirror context running");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> MirrorEngine {
        MirrorEngine::new(["osc", "amp", "out"])
    }

    fn patch() -> Snapshot {
        Snapshot::new(
            vec![
                Node::new("osc", "osc")
                    .with_param("frequency", 220.0)
                    .with_param("waveform", "sine"),
                Node::new("amp", "amp").with_param("gain", 0.5),
                Node::new("out", "out").with_param("muted", true),
            ],
            vec![Edge::new("osc", "amp"), Edge::new("amp", "out")],
        )
    }

    #[test]
    fn mirrors_voices_and_connections() {
        let mut engine = engine();
        let handle = engine.handle();
        engine.reconcile(&patch()).unwrap();

        let state = handle.state();
        assert_eq!(state.voices.len(), 3);
        assert_eq!(state.connections.len(), 2);
        assert_eq!(state.reconciles, 1);

        let osc = handle.voice("osc").unwrap();
        assert_eq!(osc.params["frequency"], 220.0);
        assert_eq!(osc.settings["waveform"], "sine");
        assert_eq!(handle.voice("out").unwrap().params["muted"], 1.0);
    }

    #[test]
    fn unsupported_node_keeps_previous_mirror() {
        let mut engine = engine();
        let handle = engine.handle();
        engine.reconcile(&patch()).unwrap();
        let before = handle.state();

        let bad = Snapshot::new(vec![Node::new("x", "theremin")], vec![]);
        let err = engine.reconcile(&bad).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnsupportedNode {
                id: "x".into(),
                node_type: "theremin".into()
            }
        );
        assert_eq!(handle.state(), before);
    }

    #[test]
    fn nested_param_is_invalid() {
        let mut engine = engine();
        let node = Node::new("amp", "amp").with_param("curve", json!([0, 1]));
        let err = engine
            .reconcile(&Snapshot::new(vec![node], vec![]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParam { key, .. } if key == "curve"));
    }

    #[test]
    fn dangling_edges_are_inert() {
        let mut engine = engine();
        let handle = engine.handle();
        let snapshot = Snapshot::new(
            vec![Node::new("amp", "amp")],
            vec![Edge::new("osc", "amp")],
        );
        engine.reconcile(&snapshot).unwrap();
        assert_eq!(handle.voice_count(), 1);
        assert_eq!(handle.connection_count(), 0);
    }

    #[test]
    fn resume_is_idempotent_until_closed() {
        let mut engine = engine();
        let handle = engine.handle();
        assert_eq!(handle.run_state(), RunState::Suspended);
        engine.resume().unwrap();
        engine.resume().unwrap();
        assert_eq!(handle.run_state(), RunState::Running);

        engine.close();
        assert_eq!(engine.resume(), Err(EngineError::ContextUnavailable));
        assert_eq!(
            engine.reconcile(&patch()),
            Err(EngineError::ContextUnavailable)
        );
    }

    #[test]
    fn registry_types_are_supported() {
        let engine = MirrorEngine::from_registry(&NodeRegistry::new());
        assert!(engine.supports("filter"));
        assert!(!engine.supports("theremin"));
    }
}
