//! HTTP entry point: WebSocket upgrade or static asset.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{HeaderMap, Uri, header};
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::AppState;

/// Any path: upgrade to a relayed WebSocket, or serve a static asset.
///
/// A request that asks for an upgrade but fails validation gets the
/// rejection response instead of a file.
pub async fn relay_entry(
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    match ws {
        Ok(ws) => {
            let router = state.router.clone();
            ws.on_failed_upgrade(|err| tracing::warn!(%err, "websocket upgrade failed"))
                .on_upgrade(move |socket| run_connection(socket, router))
                .into_response()
        }
        Err(rejection) if wants_upgrade(&headers) => {
            tracing::debug!(%rejection, path = %uri.path(), "rejected websocket upgrade");
            rejection.into_response()
        }
        Err(_) => state.static_files.serve(uri.path()).await,
    }
}

fn wants_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}
