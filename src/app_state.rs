//! Shared application state injected into the HTTP entry handler.

use crate::service::BroadcastRouter;
use crate::static_files::StaticFiles;

/// Shared state available to the HTTP entry handler via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Router over both connection pools.
    pub router: BroadcastRouter,
    /// Responder for non-upgrade requests.
    pub static_files: StaticFiles,
}
