//! HTTP response building module
//!
//! Builders for the non-JSON responses: preflight answers, conditional
//! `304`s and static file bodies. Builders never panic; a failed build is
//! logged and replaced by an empty response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{header, Response, StatusCode};

use super::cache::{expires_in, STATIC_MAX_AGE};

/// Build 204 No Content response (OPTIONS preflight)
pub fn build_no_content_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("204", &e);
            empty_response()
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(header::ETAG, etag)
        .header(header::CACHE_CONTROL, cache_control())
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            empty_response()
        })
}

/// Static file served from the public directory
pub struct StaticFile<'a> {
    pub data: Bytes,
    pub content_type: &'a str,
    pub etag: &'a str,
    /// Already formatted as an HTTP date
    pub last_modified: Option<&'a str>,
}

/// Build 200 response for a static file with one-day caching headers
pub fn build_file_response(file: StaticFile<'_>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = file.data.len();
    let body = if is_head { Bytes::new() } else { file.data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CACHE_CONTROL, cache_control())
        .header(header::EXPIRES, expires_in(STATIC_MAX_AGE))
        .header(header::ETAG, file.etag);
    if let Some(last_modified) = file.last_modified {
        builder = builder.header(header::LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        empty_response()
    })
}

fn cache_control() -> String {
    format!("public, max-age={STATIC_MAX_AGE}")
}

fn empty_response() -> Response<Full<Bytes>> {
    Response::new(Full::new(Bytes::new()))
}

/// Log response build error
pub(crate) fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
