//! # socket-relay
//!
//! Bidirectional broadcast relay between raw TCP peers and WebSocket
//! clients.
//!
//! Every chunk a TCP peer sends is delivered to every connected WebSocket
//! peer, and every message a WebSocket peer sends is delivered to every
//! connected TCP peer. Payloads are opaque bytes; there is one room. The HTTP
//! listener that accepts WebSocket upgrades also serves the browser client
//! from a static directory.
//!
//! ## Architecture
//!
//! ```text
//! TCP peers                                WebSocket peers / browsers
//!     │                                            │
//!     ├── TcpRelayEndpoint (tcp/)                  ├── relay_entry (ws/)
//!     │     accept loop, per-connection task       │     upgrade or StaticFiles
//!     │                                            ├── ws connection task
//!     │                                            ├── liveness probe
//!     │                                            │
//!     └──────────── BroadcastRouter (service/) ────┘
//!                        │
//!          ConnectionPool<TcpPeer> / ConnectionPool<WsPeer> (domain/)
//! ```
//!
//! [`server::RelayServer`] wires everything together; the pools are created
//! there and passed down explicitly, so independent relays can run side by
//! side in one process.

pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod static_files;
pub mod tcp;
pub mod ws;
