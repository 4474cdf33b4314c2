//! TCP connection state machine.
//!
//! Runs the read/write loop for a single accepted TCP stream: every chunk
//! returned by one successful read is relayed to the WebSocket pool as-is,
//! and every payload queued on the peer handle is written back in order.

use std::net::SocketAddr;

use axum::body::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::domain::{CloseReason, ConnectionState, RelayPeer, TcpPeer};
use crate::service::BroadcastRouter;

/// Size of the per-connection read buffer. One read never yields a larger
/// payload than this.
pub const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Runs the read/write loop for a single TCP connection until it closes.
///
/// - Registers the peer in the TCP pool on entry.
/// - Relays inbound chunks through [`BroadcastRouter::tcp_to_ws`].
/// - Drains the peer's outbound queue into the socket.
/// - Unregisters the peer exactly once on exit.
pub async fn run_connection(stream: TcpStream, addr: SocketAddr, router: BroadcastRouter) {
    let (peer, mut outbound_rx) = TcpPeer::new();
    let peer_id = peer.id();
    let mut state = ConnectionState::default();

    let (mut reader, mut writer) = stream.into_split();

    router.tcp_pool().add(peer).await;
    state.open();
    tracing::info!(%peer_id, %addr, "tcp peer connected");

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let reason = loop {
        tokio::select! {
            read = reader.read(&mut buf) => {
                match read {
                    Ok(0) => break CloseReason::PeerClosed,
                    Ok(n) => {
                        let Some(chunk) = buf.get(..n) else {
                            break CloseReason::PeerClosed;
                        };
                        let report = router.tcp_to_ws(Bytes::copy_from_slice(chunk)).await;
                        tracing::debug!(
                            %peer_id,
                            bytes = n,
                            delivered = report.delivered,
                            evicted = report.evicted,
                            "relayed tcp data to ws peers"
                        );
                    }
                    Err(err) => break CloseReason::ReadFailed(err),
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(payload) => {
                        if let Err(err) = writer.write_all(&payload).await {
                            break CloseReason::WriteFailed(err);
                        }
                    }
                    None => break CloseReason::Evicted,
                }
            }
        }
    };

    if state.close() {
        router.tcp_pool().remove(&peer_id).await;
    }

    match reason {
        CloseReason::PeerClosed => tracing::info!(%peer_id, %addr, "tcp peer disconnected"),
        other => tracing::warn!(%peer_id, %addr, reason = ?other, "tcp peer dropped"),
    }
}
