//! Service layer: the broadcast coupling between the two pools.
//!
//! [`BroadcastRouter`] is the only code that writes to peers of the opposite
//! domain, and the only code outside the endpoints that removes peers.

pub mod broadcast_router;

pub use broadcast_router::{BroadcastReport, BroadcastRouter, broadcast};
