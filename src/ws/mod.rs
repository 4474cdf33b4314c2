//! WebSocket side of the relay: upgrade handling, the per-connection loop,
//! and the liveness probe.
//!
//! Upgrades are accepted on every path of the HTTP listener; requests that
//! are not upgrades fall through to [`crate::static_files`].

pub mod connection;
pub mod handler;
pub mod liveness_probe;

pub use liveness_probe::{ProbeReport, run_liveness_probe, sweep};
