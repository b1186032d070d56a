//! Path resolution and file serving module
//!
//! Maps request paths onto the base directory, classifies the result, and
//! serves regular files.

use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Outcome of resolving a request path against the base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// No filesystem entry at the resolved path, or the path escapes the
    /// base directory
    Missing,
    /// Resolved to a regular file
    File(PathBuf),
    /// Resolved to a directory
    Directory(PathBuf),
}

/// Resolve a raw request path to a filesystem target under `base_dir`
///
/// The request path is joined onto the base directory without decoding, then
/// both sides are canonicalized. A candidate that fails to canonicalize does
/// not exist; one that canonicalizes outside the base directory is treated
/// exactly like a missing entry, so escapes are indistinguishable from 404s.
pub fn resolve(base_dir: &str, request_path: &str) -> Resolved {
    let relative = request_path.trim_start_matches('/');
    let candidate = Path::new(base_dir).join(relative);

    let base = match Path::new(base_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Base directory not found or inaccessible '{base_dir}': {e}"
            ));
            return Resolved::Missing;
        }
    };

    // Missing entries are common (404), no need to log
    let Ok(target) = candidate.canonicalize() else {
        return Resolved::Missing;
    };
    if !target.starts_with(&base) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            target.display()
        ));
        return Resolved::Missing;
    }

    if target.is_dir() {
        Resolved::Directory(target)
    } else {
        Resolved::File(target)
    }
}

/// Serve a single regular file as an octet stream
///
/// The file vanishing between classification and read maps to 404; any other
/// read fault maps to a generic 500 with the cause logged server-side.
pub async fn serve_file(path: &Path) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(content) => http::build_octet_response(Bytes::from(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => http::build_404_response(),
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {}", path.display(), e));
            http::build_500_response()
        }
    }
}
