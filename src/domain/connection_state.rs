//! Per-connection lifecycle shared by both endpoints.
//!
//! Every relayed connection walks `Connecting -> Open -> Closed`. The
//! transition into `Closed` is reported exactly once, which is what lets the
//! endpoints unregister a peer once no matter how many close-related
//! conditions fire.

use std::io;

/// Lifecycle of a single relayed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Accepted or upgraded, not yet registered in a pool.
    #[default]
    Connecting,
    /// Registered and relaying.
    Open,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Moves `Connecting -> Open`.
    ///
    /// Returns `false` (and changes nothing) from any other state.
    pub fn open(&mut self) -> bool {
        if *self == Self::Connecting {
            *self = Self::Open;
            true
        } else {
            false
        }
    }

    /// Moves to `Closed`.
    ///
    /// Returns `true` only for the call that left `Open`; the caller owning
    /// that `true` is the one that unregisters the peer.
    pub fn close(&mut self) -> bool {
        let was_open = *self == Self::Open;
        *self = Self::Closed;
        was_open
    }

    /// Returns `true` while the connection is relaying.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}

/// Why a connection task stopped.
#[derive(Debug)]
pub enum CloseReason {
    /// The remote end finished the stream or sent a close frame.
    PeerClosed,
    /// Reading from the transport failed.
    ReadFailed(io::Error),
    /// Writing to the transport failed.
    WriteFailed(io::Error),
    /// The peer handle was dropped from its pool by a failed broadcast.
    Evicted,
    /// The liveness probe gave up on the peer.
    Unresponsive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        assert_eq!(ConnectionState::default(), ConnectionState::Connecting);
    }

    #[test]
    fn open_then_close_reports_once() {
        let mut state = ConnectionState::default();
        assert!(state.open());
        assert!(state.is_open());
        assert!(state.close());
        assert!(!state.close());
        assert_eq!(state, ConnectionState::Closed);
    }

    #[test]
    fn closed_is_terminal() {
        let mut state = ConnectionState::default();
        state.open();
        state.close();
        assert!(!state.open());
        assert_eq!(state, ConnectionState::Closed);
    }

    #[test]
    fn close_before_open_reports_nothing() {
        let mut state = ConnectionState::default();
        assert!(!state.close());
        assert!(!state.open());
    }
}
