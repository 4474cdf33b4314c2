//! Concurrent membership set for one transport domain.
//!
//! [`ConnectionPool`] stores the handles of every open connection of one
//! domain in a `HashMap` behind a [`tokio::sync::RwLock`]. Broadcasts never
//! iterate the map under the lock; they take a snapshot and write to the
//! copies, so connection tasks can register and unregister while a fan-out is
//! in progress.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::PeerId;
use super::peer::RelayPeer;

/// Live-membership set of one transport domain.
///
/// # Concurrency
///
/// - `add` and `remove` take the write lock for a single map operation.
/// - `snapshot_for_broadcast` takes the read lock and clones the handles.
/// - No lock is held across a peer write or any other await point.
#[derive(Debug)]
pub struct ConnectionPool<P> {
    peers: RwLock<HashMap<PeerId, P>>,
}

impl<P: RelayPeer> ConnectionPool<P> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `peer`.
    ///
    /// Returns `false` and leaves the pool untouched if a peer with the same
    /// identity is already present.
    pub async fn add(&self, peer: P) -> bool {
        let mut map = self.peers.write().await;
        let id = peer.id();
        if map.contains_key(&id) {
            return false;
        }
        map.insert(id, peer);
        true
    }

    /// Unregisters the peer with the given identity, returning its handle if
    /// it was present.
    pub async fn remove(&self, id: &PeerId) -> Option<P> {
        self.peers.write().await.remove(id)
    }

    /// Returns a point-in-time copy of the current members.
    ///
    /// Each call produces a fresh snapshot; later membership changes are not
    /// reflected in it.
    pub async fn snapshot_for_broadcast(&self) -> Vec<P> {
        self.peers.read().await.values().cloned().collect()
    }

    /// Returns `true` if a peer with the given identity is registered.
    pub async fn contains(&self, id: &PeerId) -> bool {
        self.peers.read().await.contains_key(id)
    }

    /// Returns the number of registered peers.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Returns `true` if the pool has no members.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl<P: RelayPeer> Default for ConnectionPool<P> {
    fn default() -> Self {
        Self::new()
    }
}
