//! WebSocket liveness flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Observed liveness of a WebSocket peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    /// A pong arrived since the last probe (or the peer is new).
    Alive,
    /// Probed, no pong yet.
    Pending,
}

/// Lock-free liveness flag shared between a connection task (which sees
/// pongs) and the probe task (which sees intervals).
#[derive(Debug)]
pub struct Liveness {
    alive: AtomicBool,
}

impl Liveness {
    /// Creates a flag in the [`LivenessState::Alive`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
        }
    }

    /// Records a pong.
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Release);
    }

    /// Marks the peer [`LivenessState::Pending`] and returns the state it was
    /// in beforehand.
    ///
    /// `Alive` means "ping it now"; `Pending` means the previous probe went
    /// unanswered.
    pub fn begin_probe(&self) -> LivenessState {
        if self.alive.swap(false, Ordering::AcqRel) {
            LivenessState::Alive
        } else {
            LivenessState::Pending
        }
    }

    /// Returns the current state without changing it.
    #[must_use]
    pub fn state(&self) -> LivenessState {
        if self.alive.load(Ordering::Acquire) {
            LivenessState::Alive
        } else {
            LivenessState::Pending
        }
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
