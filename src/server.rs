//! Process composition: listeners, pools, router, endpoints, and probe.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::RelayConfig;
use crate::domain::ConnectionPool;
use crate::error::RelayError;
use crate::service::BroadcastRouter;
use crate::static_files::StaticFiles;
use crate::tcp::TcpRelayEndpoint;
use crate::ws::handler::relay_entry;
use crate::ws::run_liveness_probe;

/// Builds the HTTP router: every path either upgrades to a relayed
/// WebSocket or is answered with a static asset.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(relay_entry)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A relay with both listeners bound, ready to run.
///
/// Binding is split from running so that bind failures surface before any
/// task is spawned, and so callers can read the actual local addresses when
/// binding to port 0.
#[derive(Debug)]
pub struct RelayServer {
    config: RelayConfig,
    tcp_listener: TcpListener,
    http_listener: TcpListener,
    router: BroadcastRouter,
}

impl RelayServer {
    /// Binds both listeners and creates empty pools.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if either listener cannot be bound.
    pub async fn bind(config: RelayConfig) -> Result<Self, RelayError> {
        let tcp_listener = TcpRelayEndpoint::bind(config.tcp_listen_addr).await?;
        let http_listener = TcpListener::bind(config.http_listen_addr)
            .await
            .map_err(|source| RelayError::Bind {
                addr: config.http_listen_addr,
                source,
            })?;

        let router = BroadcastRouter::new(
            Arc::new(ConnectionPool::new()),
            Arc::new(ConnectionPool::new()),
        );

        Ok(Self {
            config,
            tcp_listener,
            http_listener,
            router,
        })
    }

    /// Actual address of the TCP listener.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serve`] if the OS cannot report the address.
    pub fn tcp_local_addr(&self) -> Result<SocketAddr, RelayError> {
        self.tcp_listener.local_addr().map_err(RelayError::Serve)
    }

    /// Actual address of the HTTP listener.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serve`] if the OS cannot report the address.
    pub fn http_local_addr(&self) -> Result<SocketAddr, RelayError> {
        self.http_listener.local_addr().map_err(RelayError::Serve)
    }

    /// Router over this relay's pools.
    #[must_use]
    pub fn router(&self) -> &BroadcastRouter {
        &self.router
    }

    /// Runs both endpoints and the liveness probe until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serve`] if the HTTP server stops with an I/O
    /// error.
    pub async fn run<F>(self, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send,
    {
        let Self {
            config,
            tcp_listener,
            http_listener,
            router,
        } = self;

        let state = AppState {
            router: router.clone(),
            static_files: StaticFiles::new(config.static_root.clone()),
        };
        let app = build_router(state);

        let probe = tokio::spawn(run_liveness_probe(
            Arc::clone(router.ws_pool()),
            config.liveness_interval,
        ));
        let tcp_endpoint = TcpRelayEndpoint::new(router);

        tracing::info!(
            tcp = %config.tcp_listen_addr,
            http = %config.http_listen_addr,
            static_root = %config.static_root.display(),
            "relay listening"
        );

        let result = tokio::select! {
            () = tcp_endpoint.serve(tcp_listener) => Ok(()),
            served = axum::serve(http_listener, app).into_future() => {
                served.map_err(RelayError::Serve)
            }
            () = shutdown => {
                tracing::info!("shutdown requested");
                Ok(())
            }
        };

        probe.abort();
        result
    }
}
