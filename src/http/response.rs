//! HTTP response building module
//!
//! Provides builders for the status codes this server emits. All plain-text
//! bodies are ASCII, so Content-Length is always the message byte count.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Build 200 OK response carrying raw bytes
///
/// Used for both single files and directory archives; the payload is always
/// served as an opaque octet stream.
pub fn build_octet_response(data: Bytes) -> Response<Full<Bytes>> {
    let content_length = data.len();

    Response::builder()
        .status(200)
        .header("Content-Type", "application/octet-stream")
        .header("Content-Length", content_length)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_plain_response(404, "File Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Content-Length", "Method Not Allowed".len())
        .header("Allow", "GET")
        .body(Full::new(Bytes::from("Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("Method Not Allowed")))
        })
}

/// Build 500 Internal Server Error response
///
/// The underlying fault is logged where it happens; the client only ever
/// sees the generic body.
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_plain_response(500, "Internal Server Error")
}

/// Build a plain-text response with the given status and fixed message
fn build_plain_response(status: u16, message: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .header("Content-Length", message.len())
        .body(Full::new(Bytes::from(message)))
        .unwrap_or_else(|e| {
            log_build_error(&status.to_string(), &e);
            Response::new(Full::new(Bytes::from(message)))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
