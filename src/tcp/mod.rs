//! Raw TCP side of the relay.
//!
//! Bytes are opaque: no framing is applied, and the chunk boundaries of the
//! underlying reads are not meaningful to either side.

pub mod connection;
pub mod endpoint;

pub use endpoint::TcpRelayEndpoint;
