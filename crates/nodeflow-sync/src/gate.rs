//! One-shot interaction gate.
//!
//! Browsers and most desktop audio stacks refuse to start output until the
//! user has interacted with the page or window. The host arms the gate at
//! startup and calls [`InteractionGate::fire`] from its input handler; only the
//! first call after arming reports `true`.

use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const ARMED: u8 = 1;
const FIRED: u8 = 2;

/// Single-use latch: `Idle -> Armed -> Fired`.
///
/// Safe to share between the input thread and the session thread.
#[derive(Debug, Default)]
pub struct InteractionGate {
    state: AtomicU8,
}

impl InteractionGate {
    /// A gate that has not been armed.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    /// Starts listening. Has no effect once the gate has fired.
    pub fn arm(&self) {
        let _ = self
            .state
            .compare_exchange(IDLE, ARMED, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Consumes the gate. Returns `true` exactly once, for the first call
    /// after [`arm`](Self::arm).
    pub fn fire(&self) -> bool {
        self.state
            .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// `true` while waiting for the first interaction.
    pub fn is_armed(&self) -> bool {
        self.state.load(Ordering::Acquire) == ARMED
    }

    /// `true` once the gate has fired.
    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}
