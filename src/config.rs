//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The relay core never reads the
//! environment itself; `main` builds a [`RelayConfig`] and hands it over.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RelayError;

/// Default TCP relay listener.
pub const DEFAULT_TCP_LISTEN_ADDR: &str = "0.0.0.0:8081";

/// Default HTTP + WebSocket listener.
pub const DEFAULT_HTTP_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default WebSocket ping interval in seconds.
pub const DEFAULT_LIVENESS_INTERVAL_SECS: u64 = 30;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT` (after loading `.env`), defaulting to text.
    ///
    /// Kept separate from [`RelayConfig::from_env`] so the tracing subscriber
    /// can be installed before anything else is parsed.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::parse(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Top-level relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address of the raw TCP listener.
    pub tcp_listen_addr: SocketAddr,

    /// Socket address of the HTTP server that also accepts WebSocket
    /// upgrades.
    pub http_listen_addr: SocketAddr,

    /// Directory static assets are served from.
    pub static_root: PathBuf,

    /// Interval between WebSocket liveness probes.
    pub liveness_interval: Duration,

    /// Tracing output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidConfig`] if `TCP_LISTEN_ADDR` or
    /// `HTTP_LISTEN_ADDR` is set but cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();

        let tcp_listen_addr = parse_addr("TCP_LISTEN_ADDR", DEFAULT_TCP_LISTEN_ADDR)?;
        let http_listen_addr = parse_addr("HTTP_LISTEN_ADDR", DEFAULT_HTTP_LISTEN_ADDR)?;

        let static_root = std::env::var("STATIC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let liveness_secs: u64 =
            parse_env("LIVENESS_INTERVAL_SECS", DEFAULT_LIVENESS_INTERVAL_SECS).max(1);

        Ok(Self {
            tcp_listen_addr,
            http_listen_addr,
            static_root,
            liveness_interval: Duration::from_secs(liveness_secs),
            log_format: LogFormat::from_env(),
        })
    }

    /// Configuration bound to loopback ephemeral ports, serving `static_root`.
    ///
    /// Used by tests and embedders that want the OS to pick free ports.
    #[must_use]
    pub fn ephemeral(static_root: impl Into<PathBuf>) -> Self {
        Self {
            tcp_listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            http_listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            static_root: static_root.into(),
            liveness_interval: Duration::from_secs(DEFAULT_LIVENESS_INTERVAL_SECS),
            log_format: LogFormat::Text,
        }
    }
}

/// Parses a socket address variable, using `default` when unset.
fn parse_addr(key: &str, default: &str) -> Result<SocketAddr, RelayError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| RelayError::InvalidConfig(format!("{key}={raw}: {e}")))
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or_default(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_or_default<T: std::str::FromStr>(key: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = raw, "invalid config value, using default");
        default
    })
}
