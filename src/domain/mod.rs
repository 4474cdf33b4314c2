//! Domain layer: peer identity, peer handles, connection lifecycle, and the
//! concurrent connection pool.
//!
//! Nothing in here touches a socket. The endpoints in [`crate::tcp`] and
//! [`crate::ws`] own the sockets and use these types for bookkeeping.

pub mod connection_pool;
pub mod connection_state;
pub mod liveness;
pub mod peer;
pub mod peer_id;

pub use connection_pool::ConnectionPool;
pub use connection_state::{CloseReason, ConnectionState};
pub use liveness::{Liveness, LivenessState};
pub use peer::{Domain, RelayPeer, TcpPeer, WsOutbound, WsPeer};
pub use peer_id::PeerId;
