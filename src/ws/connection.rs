//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single upgraded WebSocket: relays
//! inbound messages to the TCP pool, writes queued payloads and pings, and
//! tracks pongs for the liveness probe.

use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::{CloseReason, ConnectionState, PeerId, RelayPeer, WsOutbound, WsPeer};
use crate::service::BroadcastRouter;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Registers the peer in the WebSocket pool in the alive state.
/// - Relays text and binary messages through [`BroadcastRouter::ws_to_tcp`].
/// - Marks the peer alive on every pong.
/// - Stops on close, transport error, eviction, or a forced close from the
///   liveness probe, and unregisters the peer exactly once.
pub async fn run_connection(socket: WebSocket, router: BroadcastRouter) {
    let (peer, mut outbound_rx) = WsPeer::new();
    let peer_id = peer.id();
    let liveness = Arc::clone(peer.liveness());
    let terminate = Arc::clone(peer.terminate_signal());
    let mut state = ConnectionState::default();

    let (mut ws_tx, mut ws_rx) = socket.split();

    router.ws_pool().add(peer).await;
    state.open();
    tracing::info!(%peer_id, "ws peer connected");

    let reason = loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Binary(data))) => relay(&router, peer_id, data).await,
                    Some(Ok(Message::Text(text))) => {
                        let data = Bytes::copy_from_slice(text.as_str().as_bytes());
                        relay(&router, peer_id, data).await;
                    }
                    Some(Ok(Message::Pong(_))) => liveness.mark_alive(),
                    // Pings are answered by the protocol layer.
                    Some(Ok(Message::Ping(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break CloseReason::PeerClosed,
                    Some(Err(err)) => break CloseReason::ReadFailed(io::Error::other(err)),
                }
            }
            // Payload or ping queued on the peer handle
            outbound = outbound_rx.recv() => {
                let message = match outbound {
                    Some(WsOutbound::Payload(data)) => Message::Binary(data),
                    Some(WsOutbound::Ping) => Message::Ping(Bytes::new()),
                    None => break CloseReason::Evicted,
                };
                // A peer that stopped reading stalls this send; the forced
                // close still has to get through.
                let sent = tokio::select! {
                    sent = ws_tx.send(message) => sent,
                    () = terminate.notified() => break CloseReason::Unresponsive,
                };
                if let Err(err) = sent {
                    break CloseReason::WriteFailed(io::Error::other(err));
                }
            }
            () = terminate.notified() => break CloseReason::Unresponsive,
        }
    };

    if state.close() {
        router.ws_pool().remove(&peer_id).await;
    }

    match reason {
        CloseReason::PeerClosed => tracing::info!(%peer_id, "ws peer disconnected"),
        other => tracing::warn!(%peer_id, reason = ?other, "ws peer dropped"),
    }
}

async fn relay(router: &BroadcastRouter, peer_id: PeerId, payload: Bytes) {
    let bytes = payload.len();
    let report = router.ws_to_tcp(payload).await;
    tracing::debug!(
        %peer_id,
        bytes,
        delivered = report.delivered,
        evicted = report.evicted,
        "relayed ws message to tcp peers"
    );
}
