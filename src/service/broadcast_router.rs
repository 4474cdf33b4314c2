//! Broadcast router: fans a payload out to every member of the opposite pool.

use std::sync::Arc;

use axum::body::Bytes;

use crate::domain::{ConnectionPool, RelayPeer, TcpPeer, WsPeer};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastReport {
    /// Peers the payload was queued for.
    pub delivered: usize,
    /// Peers whose write failed and that were dropped from their pool.
    pub evicted: usize,
}

/// Couples the TCP pool and the WebSocket pool.
///
/// Stateless coordinator: owns references to both pools and nothing else.
/// Every broadcast follows the same pattern: snapshot the target pool, queue
/// the payload on each member, evict members whose queue is closed.
#[derive(Debug, Clone)]
pub struct BroadcastRouter {
    tcp_pool: Arc<ConnectionPool<TcpPeer>>,
    ws_pool: Arc<ConnectionPool<WsPeer>>,
}

impl BroadcastRouter {
    /// Creates a router over the given pools.
    #[must_use]
    pub fn new(
        tcp_pool: Arc<ConnectionPool<TcpPeer>>,
        ws_pool: Arc<ConnectionPool<WsPeer>>,
    ) -> Self {
        Self { tcp_pool, ws_pool }
    }

    /// Returns the TCP pool.
    #[must_use]
    pub fn tcp_pool(&self) -> &Arc<ConnectionPool<TcpPeer>> {
        &self.tcp_pool
    }

    /// Returns the WebSocket pool.
    #[must_use]
    pub fn ws_pool(&self) -> &Arc<ConnectionPool<WsPeer>> {
        &self.ws_pool
    }

    /// Relays bytes read from a TCP peer to every WebSocket peer.
    pub async fn tcp_to_ws(&self, payload: Bytes) -> BroadcastReport {
        broadcast(payload, &self.ws_pool).await
    }

    /// Relays a message received from a WebSocket peer to every TCP peer.
    pub async fn ws_to_tcp(&self, payload: Bytes) -> BroadcastReport {
        broadcast(payload, &self.tcp_pool).await
    }
}

/// Queues `payload` on every member of a snapshot of `pool`.
///
/// A failed write evicts that member and the fan-out carries on with the
/// rest. Nothing is retried and nothing is surfaced to the caller beyond the
/// report.
pub async fn broadcast<P: RelayPeer>(payload: Bytes, pool: &ConnectionPool<P>) -> BroadcastReport {
    let mut report = BroadcastReport::default();

    for peer in pool.snapshot_for_broadcast().await {
        // Bytes clones share the buffer.
        match peer.send(payload.clone()) {
            Ok(()) => report.delivered += 1,
            Err(err) => {
                if pool.remove(&peer.id()).await.is_some() {
                    report.evicted += 1;
                }
                tracing::warn!(
                    peer_id = %peer.id(),
                    domain = %peer.domain(),
                    %err,
                    "evicting peer after failed write"
                );
            }
        }
    }

    report
}
