//! TCP accept loop.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use super::connection::run_connection;
use crate::error::RelayError;
use crate::service::BroadcastRouter;

/// Accepts raw TCP connections and hands each one to its own task.
#[derive(Debug, Clone)]
pub struct TcpRelayEndpoint {
    router: BroadcastRouter,
}

impl TcpRelayEndpoint {
    /// Creates an endpoint relaying through `router`.
    #[must_use]
    pub fn new(router: BroadcastRouter) -> Self {
        Self { router }
    }

    /// Binds the TCP listener.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the address is in use or cannot be
    /// bound. This is a startup fault.
    pub async fn bind(addr: SocketAddr) -> Result<TcpListener, RelayError> {
        TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind { addr, source })
    }

    /// Runs the accept loop forever.
    ///
    /// Accept errors (for example running out of file descriptors) affect
    /// only the connection being accepted; they are logged and the loop
    /// continues.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    if let Err(err) = stream.set_nodelay(true) {
                        tracing::debug!(%addr, %err, "failed to set TCP_NODELAY");
                    }
                    let router = self.router.clone();
                    tokio::spawn(run_connection(stream, addr, router));
                }
                Err(err) => {
                    tracing::error!(%err, "tcp accept failed");
                }
            }
        }
    }
}
