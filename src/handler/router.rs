//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! resolution, and dispatch to file serving or directory archiving.

use crate::config::AppState;
use crate::handler::{archive, files};
use crate::http;
use crate::logger;
use crate::logger::AccessLogEntry;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let access_log = state.config.logging.access_log;

    if access_log {
        logger::log_request(&method, &uri, version);
    }
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let referer = header_string(&req, "referer");
    let user_agent = header_string(&req, "user-agent");

    let response = dispatch(state.base_dir(), &method, uri.path()).await;

    if access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = version_label(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = referer;
        entry.user_agent = user_agent;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch a request to the matching serving path
///
/// Non-GET methods are rejected up front; GET requests are resolved against
/// the base directory and classified as file, directory, or missing.
pub async fn dispatch(base_dir: &str, method: &Method, path: &str) -> Response<Full<Bytes>> {
    if !is_get(method) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return http::build_405_response();
    }

    match files::resolve(base_dir, path) {
        files::Resolved::Missing => http::build_404_response(),
        files::Resolved::File(file) => files::serve_file(&file).await,
        files::Resolved::Directory(dir) => archive::serve_directory(&dir).await,
    }
}

/// Method comparison is case-insensitive: standard clients send `GET`, but
/// lowercase spellings are accepted and served the same way.
fn is_get(method: &Method) -> bool {
    method.as_str().eq_ignore_ascii_case("GET")
}

fn header_string(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}
