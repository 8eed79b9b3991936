//! Host events.
//!
//! Container measurement, pointer input, and renderer callbacks may fire on
//! threads other than the one that owns the session. They send a
//! [`HostEvent`] through an [`EventSender`]; the session drains the matching
//! [`EventReceiver`] on its own thread, in the order the events were sent.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use nodeflow_core::{Connection, Dimensions, EdgeChange, Node, NodeChange, NodeData, NodeId};

/// Something the host wants the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The container was measured or resized.
    Resize(Dimensions),
    /// The user clicked, tapped, or pressed a key.
    Interaction,
    /// Node change-list from the renderer.
    NodeChanges(Vec<NodeChange>),
    /// Edge change-list from the renderer.
    EdgeChanges(Vec<EdgeChange>),
    /// A connection drag finished.
    Connect(Connection),
    /// Add a node.
    InsertNode(Node),
    /// Merge parameters into a node.
    UpdateNode {
        /// Target node.
        id: NodeId,
        /// Keys to overwrite.
        data: NodeData,
    },
    /// Remove a node.
    RemoveNode(NodeId),
}

/// Sending half, cheap to clone and safe to move to other threads.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<HostEvent>,
}

impl EventSender {
    /// Queue an event (non-blocking). Returns `false` if the session is gone.
    pub fn send(&self, event: HostEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Queue a resize.
    pub fn resize(&self, width: f64, height: f64) -> bool {
        self.send(HostEvent::Resize(Dimensions::new(width, height)))
    }

    /// Queue a user interaction.
    pub fn interaction(&self) -> bool {
        self.send(HostEvent::Interaction)
    }
}

/// Receiving half, drained by the session.
#[derive(Debug)]
pub struct EventReceiver {
    rx: Receiver<HostEvent>,
}

impl EventReceiver {
    /// Next queued event, if any.
    pub fn try_next(&self) -> Option<HostEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until an event arrives. Returns `None` once every sender has
    /// been dropped and the queue is empty.
    pub fn next_blocking(&self) -> Option<HostEvent> {
        self.rx.recv().ok()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = unbounded();
    (EventSender { tx }, EventReceiver { rx })
}
