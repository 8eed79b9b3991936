//! Forwards store snapshots to a [`SignalEngine`].
//!
//! The bridge subscribes to the store and calls the engine once per distinct
//! snapshot. Engine calls are serialized: a snapshot that arrives while a
//! reconcile is in flight is parked, and if several arrive only the newest is
//! kept. The in-flight caller drains it when the engine returns, so the engine
//! always ends up reconciled against the latest graph without replaying
//! intermediate states.
//!
//! Failures never reach the store. They are logged, recorded for the host to
//! collect, and not retried; the next distinct snapshot triggers a new attempt.

use std::sync::Arc;

use nodeflow_core::{GraphStore, Snapshot, SubscriptionId};
use parking_lot::Mutex;
use serde::Serialize;

use crate::engine::{EngineError, SignalEngine};
use crate::gate::InteractionGate;

/// Counters describing what the bridge has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Snapshots the engine accepted.
    pub forwarded: u64,
    /// Snapshots the engine rejected.
    pub failed: u64,
    /// Deliveries ignored because the snapshot was already seen, in flight or
    /// pending.
    pub skipped: u64,
    /// Pending snapshots superseded by a newer one before being forwarded.
    pub coalesced: u64,
}

#[derive(Default)]
struct BridgeState {
    in_flight: Option<Snapshot>,
    pending: Option<Snapshot>,
    last_seen: Option<Snapshot>,
    last_good: Option<Snapshot>,
    last_error: Option<EngineError>,
    stats: SyncStats,
}

impl BridgeState {
    fn already_known(&self, snapshot: &Snapshot) -> bool {
        let matches = |s: &Option<Snapshot>| s.as_ref().is_some_and(|s| s.content_eq(snapshot));
        matches(&self.in_flight) || matches(&self.last_seen) || matches(&self.pending)
    }
}

/// Keeps a [`SignalEngine`] in step with a [`GraphStore`].
pub struct SyncBridge {
    engine: Mutex<Box<dyn SignalEngine + Send>>,
    state: Mutex<BridgeState>,
    gate: InteractionGate,
}

impl SyncBridge {
    /// Wraps an engine. Nothing is forwarded until [`observe`](Self::observe)
    /// or [`attach`](Self::attach) is called.
    pub fn new(engine: impl SignalEngine + Send + 'static) -> Self {
        Self::from_boxed(Box::new(engine))
    }

    /// Wraps an already boxed engine.
    pub fn from_boxed(engine: Box<dyn SignalEngine + Send>) -> Self {
        Self {
            engine: Mutex::new(engine),
            state: Mutex::new(BridgeState::default()),
            gate: InteractionGate::new(),
        }
    }

    /// Subscribes the bridge to `store` and forwards the current snapshot.
    pub fn attach(self: &Arc<Self>, store: &mut GraphStore) -> SubscriptionId {
        let bridge = Arc::clone(self);
        let id = store.subscribe(move |snapshot| bridge.observe(snapshot));
        self.observe(&store.snapshot());
        id
    }

    /// Delivers a snapshot.
    ///
    /// Returns once the engine has seen this snapshot or a newer one, unless
    /// another caller is mid-reconcile, in which case the snapshot is parked
    /// for that caller to forward.
    pub fn observe(&self, snapshot: &Snapshot) {
        {
            let mut state = self.state.lock();
            if state.already_known(snapshot) {
                state.stats.skipped += 1;
                tracing::trace!("snapshot already forwarded, skipping");
                return;
            }
            if state.in_flight.is_some() {
                if state.pending.replace(snapshot.clone()).is_some() {
                    state.stats.coalesced += 1;
                }
                tracing::trace!("reconcile in flight, parking snapshot");
                return;
            }
            state.in_flight = Some(snapshot.clone());
        }

        let mut next = snapshot.clone();
        loop {
            let result = self.engine.lock().reconcile(&next);

            let mut state = self.state.lock();
            match result {
                Ok(()) => {
                    state.stats.forwarded += 1;
                    tracing::trace!(
                        nodes = next.nodes().len(),
                        edges = next.edges().len(),
                        "snapshot forwarded"
                    );
                    state.last_good = Some(next.clone());
                }
                Err(err) => {
                    state.stats.failed += 1;
                    tracing::warn!(%err, "engine rejected snapshot");
                    state.last_error = Some(err);
                }
            }
            state.last_seen = Some(next);

            match state.pending.take() {
                Some(pending) => {
                    state.in_flight = Some(pending.clone());
                    next = pending;
                }
                None => {
                    state.in_flight = None;
                    return;
                }
            }
        }
    }

    /// Arms the one-shot interaction gate.
    pub fn arm_interaction(&self) {
        self.gate.arm();
    }

    /// Handles a user interaction.
    ///
    /// The first call after [`arm_interaction`](Self::arm_interaction)
    /// resumes the engine and returns `Ok(true)`. Every later call returns
    /// `Ok(false)` without touching the engine.
    pub fn on_interaction(&self) -> Result<bool, EngineError> {
        if !self.gate.fire() {
            return Ok(false);
        }
        match self.engine.lock().resume() {
            Ok(()) => {
                tracing::info!("engine resumed after first interaction");
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(%err, "engine failed to resume");
                self.state.lock().last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// The interaction gate.
    pub fn gate(&self) -> &InteractionGate {
        &self.gate
    }

    /// The most recent engine error that has not been taken.
    pub fn last_error(&self) -> Option<EngineError> {
        self.state.lock().last_error.clone()
    }

    /// Takes the most recent engine error.
    pub fn take_error(&self) -> Option<EngineError> {
        self.state.lock().last_error.take()
    }

    /// The last snapshot the engine accepted.
    pub fn last_good(&self) -> Option<Snapshot> {
        self.state.lock().last_good.clone()
    }

    /// `true` if the engine last accepted exactly this snapshot.
    pub fn is_synced_with(&self, snapshot: &Snapshot) -> bool {
        self.state
            .lock()
            .last_good
            .as_ref()
            .is_some_and(|s| s.content_eq(snapshot))
    }

    /// Counters so far.
    pub fn stats(&self) -> SyncStats {
        self.state.lock().stats
    }
}

impl std::fmt::Debug for SyncBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SyncBridge")
            .field("in_flight", &state.in_flight.is_some())
            .field("pending", &state.pending.is_some())
            .field("last_error", &state.last_error)
            .field("stats", &state.stats)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::{EmptyCatalog, Node, NodeSeed};
    use std::sync::{OnceLock, Weak};

    /// Records the node count of every reconciled snapshot.
    #[derive(Default)]
    struct Recording {
        seen: Arc<Mutex<Vec<usize>>>,
        resumes: Arc<Mutex<u32>>,
        fail_on: Option<&'static str>,
    }

    impl SignalEngine for Recording {
        fn reconcile(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
            if let Some(bad) = self.fail_on
                && let Some(node) = snapshot.nodes().iter().find(|n| n.node_type == bad)
            {
                return Err(EngineError::UnsupportedNode {
                    id: node.id.clone(),
                    node_type: node.node_type.clone(),
                });
            }
            self.seen.lock().push(snapshot.nodes().len());
            Ok(())
        }

        fn resume(&mut self) -> Result<(), EngineError> {
            *self.resumes.lock() += 1;
            Ok(())
        }
    }

    fn snapshot(n: usize) -> Snapshot {
        Snapshot::new(
            (0..n).map(|i| Node::new(format!("n{i}"), "osc")).collect(),
            vec![],
        )
    }

    #[test]
    fn forwards_each_distinct_snapshot_once() {
        let engine = Recording::default();
        let seen = Arc::clone(&engine.seen);
        let bridge = SyncBridge::new(engine);

        let a = snapshot(1);
        bridge.observe(&a);
        bridge.observe(&a.clone());
        bridge.observe(&snapshot(2));

        assert_eq!(*seen.lock(), vec![1, 2]);
        let stats = bridge.stats();
        assert_eq!(stats.forwarded, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn failure_is_recorded_and_not_retried() {
        let engine = Recording {
            fail_on: Some("theremin"),
            ..Recording::default()
        };
        let seen = Arc::clone(&engine.seen);
        let bridge = SyncBridge::new(engine);

        let good = snapshot(1);
        bridge.observe(&good);
        let bad = Snapshot::new(vec![Node::new("t", "theremin")], vec![]);
        bridge.observe(&bad);
        bridge.observe(&bad);

        assert!(matches!(
            bridge.last_error(),
            Some(EngineError::UnsupportedNode { .. })
        ));
        assert!(bridge.is_synced_with(&good));
        assert_eq!(bridge.stats().failed, 1);
        assert_eq!(bridge.stats().skipped, 1);

        assert!(bridge.take_error().is_some());
        assert!(bridge.last_error().is_none());

        bridge.observe(&snapshot(3));
        assert_eq!(*seen.lock(), vec![1, 3]);
    }

    /// Delivers extra snapshots to the bridge from inside `reconcile`, the way
    /// a second thread would while a forward is in flight.
    struct Reentrant {
        bridge: Arc<OnceLock<Weak<SyncBridge>>>,
        inject: Vec<Snapshot>,
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl SignalEngine for Reentrant {
        fn reconcile(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
            self.seen.lock().push(snapshot.nodes().len());
            if let Some(bridge) = self.bridge.get().and_then(Weak::upgrade) {
                for s in self.inject.drain(..) {
                    bridge.observe(&s);
                }
            }
            Ok(())
        }

        fn resume(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn snapshots_during_reconcile_coalesce_to_latest() {
        let slot = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bridge = Arc::new(SyncBridge::new(Reentrant {
            bridge: Arc::clone(&slot),
            inject: vec![snapshot(2), snapshot(3), snapshot(4)],
            seen: Arc::clone(&seen),
        }));
        slot.set(Arc::downgrade(&bridge)).ok();

        bridge.observe(&snapshot(1));

        assert_eq!(*seen.lock(), vec![1, 4]);
        let stats = bridge.stats();
        assert_eq!(stats.forwarded, 2);
        assert_eq!(stats.coalesced, 2);
    }

    #[test]
    fn redelivery_during_reconcile_is_skipped() {
        let slot = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let current = snapshot(1);
        let bridge = Arc::new(SyncBridge::new(Reentrant {
            bridge: Arc::clone(&slot),
            inject: vec![current.clone()],
            seen: Arc::clone(&seen),
        }));
        slot.set(Arc::downgrade(&bridge)).ok();

        bridge.observe(&current);

        assert_eq!(*seen.lock(), vec![1]);
        let stats = bridge.stats();
        assert_eq!(stats.forwarded, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.coalesced, 0);
    }

    #[test]
    fn attach_forwards_initial_and_later_snapshots() {
        let engine = Recording::default();
        let seen = Arc::clone(&engine.seen);
        let bridge = Arc::new(SyncBridge::new(engine));
        let mut store = GraphStore::new(
            vec![NodeSeed::new("a", "osc"), NodeSeed::new("b", "out")],
            vec![],
            &EmptyCatalog,
        );

        bridge.attach(&mut store);
        store.remove_node("b");
        store.remove_node("b");

        assert_eq!(*seen.lock(), vec![2, 1]);
        assert!(bridge.is_synced_with(&store.snapshot()));
    }

    #[test]
    fn interaction_resumes_exactly_once() {
        let engine = Recording::default();
        let resumes = Arc::clone(&engine.resumes);
        let bridge = SyncBridge::new(engine);

        assert!(!bridge.on_interaction().unwrap());
        bridge.arm_interaction();
        assert!(bridge.on_interaction().unwrap());
        assert!(!bridge.on_interaction().unwrap());
        assert_eq!(*resumes.lock(), 1);
    }
}
