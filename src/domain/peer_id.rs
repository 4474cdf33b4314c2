//! Type-safe peer identifier.
//!
//! [`PeerId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that peer
//! identities cannot be confused with other UUIDs flowing through the relay.

use std::fmt;

/// Unique identifier for one relayed connection.
///
/// Generated once when a connection is accepted or upgraded and immutable
/// thereafter. Used as the key in [`super::ConnectionPool`] and as the
/// `peer_id` field of every connection-scoped log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(uuid::Uuid);

impl PeerId {
    /// Creates a new random `PeerId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
