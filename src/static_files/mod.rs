//! Static asset responder for the browser client.
//!
//! Maps `/` to `index.html`, resolves every other path under the configured
//! root, and answers with a content type chosen from a fixed extension table.
//! Anything missing or of an unknown type gets `404.html` with status 404;
//! any other filesystem failure gets a 500.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::StaticError;

/// File served for `/`.
pub const INDEX_FILE: &str = "index.html";

/// File whose contents accompany every 404.
pub const NOT_FOUND_FILE: &str = "404.html";

/// Returns the content type for a file extension, or `None` if the extension
/// is not served.
#[must_use]
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "html" => Some("text/html"),
        "js" => Some("text/javascript"),
        "css" => Some("text/css"),
        "png" => Some("image/png"),
        "jpg" => Some("image/jpeg"),
        _ => None,
    }
}

/// Serves files from one directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: Arc<PathBuf>,
}

impl StaticFiles {
    /// Creates a responder rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    /// Answers a request for `request_path`.
    pub async fn serve(&self, request_path: &str) -> Response {
        match self.load(request_path).await {
            Ok((content_type, body)) => {
                (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            Err(StaticError::NotFound(path)) => {
                tracing::debug!(%path, "static asset not found");
                self.not_found().await
            }
            Err(err) => {
                tracing::warn!(path = %request_path, %err, "static asset read failed");
                err.into_response()
            }
        }
    }

    /// Resolves and reads one asset.
    ///
    /// # Errors
    ///
    /// Returns [`StaticError::NotFound`] if the path escapes the root, has an
    /// unrecognized extension, or names a file that does not exist, and
    /// [`StaticError::Io`] for any other read failure.
    pub async fn load(&self, request_path: &str) -> Result<(&'static str, Vec<u8>), StaticError> {
        let not_found = || StaticError::NotFound(request_path.to_string());

        let relative = resolve_relative(request_path).ok_or_else(not_found)?;
        let content_type = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for)
            .ok_or_else(not_found)?;

        match tokio::fs::read(self.root.join(&relative)).await {
            Ok(body) => Ok((content_type, body)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(err) => Err(StaticError::Io(err)),
        }
    }

    /// 404 response carrying the contents of `404.html`, or an empty body if
    /// that file cannot be read either.
    async fn not_found(&self) -> Response {
        let body = tokio::fs::read(self.root.join(NOT_FOUND_FILE))
            .await
            .unwrap_or_default();
        (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html")],
            body,
        )
            .into_response()
    }
}

/// Turns a URL path into a path relative to the root.
///
/// Returns `None` for anything that would leave the root.
fn resolve_relative(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from(INDEX_FILE));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}
