//! Periodic ping sweep over the WebSocket pool.
//!
//! A half-open connection never produces a close event, so the only way to
//! notice it is to ask. Each sweep pings every peer that answered since the
//! previous sweep and force-closes every peer that did not.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::domain::{ConnectionPool, LivenessState, RelayPeer, WsPeer};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeReport {
    /// Peers that were pinged and are now pending.
    pub pinged: usize,
    /// Peers that were closed and removed.
    pub terminated: usize,
}

/// Runs one probe over a snapshot of `pool`.
pub async fn sweep(pool: &ConnectionPool<WsPeer>) -> ProbeReport {
    let mut report = ProbeReport::default();

    for peer in pool.snapshot_for_broadcast().await {
        let peer_id = peer.id();
        match peer.liveness().begin_probe() {
            LivenessState::Alive => match peer.ping() {
                Ok(()) => report.pinged += 1,
                Err(err) => {
                    pool.remove(&peer_id).await;
                    report.terminated += 1;
                    tracing::debug!(%peer_id, %err, "ws peer gone before ping");
                }
            },
            LivenessState::Pending => {
                peer.terminate();
                pool.remove(&peer_id).await;
                report.terminated += 1;
                tracing::warn!(%peer_id, "ws peer missed pong, terminating");
            }
        }
    }

    report
}

/// Sweeps `pool` every `period`, forever.
///
/// The first sweep happens one full period after start so that new peers
/// always get a whole interval to answer.
pub async fn run_liveness_probe(pool: Arc<ConnectionPool<WsPeer>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let report = sweep(&pool).await;
        if report != ProbeReport::default() {
            tracing::debug!(
                pinged = report.pinged,
                terminated = report.terminated,
                "liveness sweep"
            );
        }
    }
}
