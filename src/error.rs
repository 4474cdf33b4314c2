//! Relay error types.
//!
//! [`RelayError`] covers the relay core and process startup. [`StaticError`]
//! covers the static asset responder and maps each variant to an HTTP status
//! code.

use std::io;
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::domain::PeerId;

/// Errors raised by the relay core and its startup path.
///
/// # Fault classes
///
/// | Variant         | Scope                | Handling                     |
/// |-----------------|----------------------|------------------------------|
/// | `Bind`          | startup              | fatal, process exits         |
/// | `InvalidConfig` | startup              | fatal, process exits         |
/// | `Serve`         | listener             | fatal, process exits         |
/// | `PeerClosed`    | one destination peer | peer evicted, broadcast goes on |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The HTTP server stopped with an I/O error.
    #[error("http server failed: {0}")]
    Serve(#[source] io::Error),

    /// A write was attempted on a connection whose task already stopped.
    #[error("peer {0} is closed")]
    PeerClosed(PeerId),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while answering a static asset request.
#[derive(Debug, thiserror::Error)]
pub enum StaticError {
    /// The file is absent, outside the root, or has an unrecognized
    /// extension.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other filesystem failure.
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
}

impl StaticError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StaticError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::NotFound(_) => String::new(),
            Self::Io(err) => format!(
                "Sorry, check with the site admin for error: {:?} ..\n",
                err.kind()
            ),
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
