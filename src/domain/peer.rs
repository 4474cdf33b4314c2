//! Peer handles for the two transport domains.
//!
//! A peer handle is what a [`super::ConnectionPool`] stores: an identity plus
//! the sending side of the connection's outbound queue. The connection task
//! owns the receiving side and is the only code that touches the socket, so
//! a write through a handle never blocks on I/O. When the task ends the queue
//! closes and every further [`RelayPeer::send`] fails, which the router
//! treats as "evict this peer".

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use tokio::sync::{Notify, mpsc};

use super::{Liveness, PeerId};
use crate::error::RelayError;

/// The transport a peer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Raw TCP stream.
    Tcp,
    /// WebSocket session.
    WebSocket,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::WebSocket => f.write_str("ws"),
        }
    }
}

/// A handle to one open connection that payloads can be written to.
pub trait RelayPeer: Clone + Send + Sync + 'static {
    /// Identity of the connection.
    fn id(&self) -> PeerId;

    /// Transport domain of the connection.
    fn domain(&self) -> Domain;

    /// Queues `payload` for delivery without waiting on the socket.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::PeerClosed`] if the connection task has already
    /// stopped.
    fn send(&self, payload: Bytes) -> Result<(), RelayError>;
}

/// Handle to an accepted TCP connection.
#[derive(Debug, Clone)]
pub struct TcpPeer {
    id: PeerId,
    outbound: mpsc::UnboundedSender<Bytes>,
}

impl TcpPeer {
    /// Creates a handle, returning the queue the connection task drains into
    /// the socket.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let peer = Self {
            id: PeerId::new(),
            outbound,
        };
        (peer, rx)
    }
}

impl RelayPeer for TcpPeer {
    fn id(&self) -> PeerId {
        self.id
    }

    fn domain(&self) -> Domain {
        Domain::Tcp
    }

    fn send(&self, payload: Bytes) -> Result<(), RelayError> {
        self.outbound
            .send(payload)
            .map_err(|_| RelayError::PeerClosed(self.id))
    }
}

/// Work queued for a WebSocket connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsOutbound {
    /// Relay bytes as a binary message.
    Payload(Bytes),
    /// Send a liveness ping.
    Ping,
}

/// Handle to an upgraded WebSocket connection.
#[derive(Debug, Clone)]
pub struct WsPeer {
    id: PeerId,
    outbound: mpsc::UnboundedSender<WsOutbound>,
    liveness: Arc<Liveness>,
    terminate: Arc<Notify>,
}

impl WsPeer {
    /// Creates a handle in the alive state, returning the queue the
    /// connection task drains into the socket.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WsOutbound>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let peer = Self {
            id: PeerId::new(),
            outbound,
            liveness: Arc::new(Liveness::new()),
            terminate: Arc::new(Notify::new()),
        };
        (peer, rx)
    }

    /// Liveness flag shared with the connection task.
    #[must_use]
    pub fn liveness(&self) -> &Arc<Liveness> {
        &self.liveness
    }

    /// Signal the connection task waits on for a forced close.
    #[must_use]
    pub fn terminate_signal(&self) -> &Arc<Notify> {
        &self.terminate
    }

    /// Queues a liveness ping.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::PeerClosed`] if the connection task has already
    /// stopped.
    pub fn ping(&self) -> Result<(), RelayError> {
        self.outbound
            .send(WsOutbound::Ping)
            .map_err(|_| RelayError::PeerClosed(self.id))
    }

    /// Asks the connection task to drop the socket without a close
    /// handshake.
    ///
    /// The permit is stored, so this works even if the task is not currently
    /// waiting.
    pub fn terminate(&self) {
        self.terminate.notify_one();
    }
}

impl RelayPeer for WsPeer {
    fn id(&self) -> PeerId {
        self.id
    }

    fn domain(&self) -> Domain {
        Domain::WebSocket
    }

    fn send(&self, payload: Bytes) -> Result<(), RelayError> {
        self.outbound
            .send(WsOutbound::Payload(payload))
            .map_err(|_| RelayError::PeerClosed(self.id))
    }
}
