//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, CORS,
//! preflight answers, API dispatch and the static file fallback.

use crate::api::{self, ApiError, ApiRequest};
use crate::config::{AppState, HttpConfig};
use crate::handler::static_files::{self, StaticRequest};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let entry = state
        .access_log_enabled()
        .then(|| AccessLogEntry::from_request(peer, &req));
    let origin = req.headers().get(header::ORIGIN).cloned();

    let mut response = route_request(req, &state).await;
    apply_common_headers(&mut response, origin.as_ref(), &state.config.http);

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    // 1. Check HTTP method
    if !is_supported_method(&parts.method) {
        logger::log_warning(&format!("Unsupported method: {}", parts.method));
        return ApiError::bad_request(format!(
            "Unsupported method \"{}\" or URL \"{}\"",
            parts.method, parts.uri
        ))
        .into_response();
    }

    // 2. Preflight
    if parts.method == Method::OPTIONS {
        return http::build_no_content_response();
    }

    // 3. Check body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&parts, max_body_size) {
        return resp;
    }

    // 4. API routes
    if let Some(matched) = state.router.dispatch(&parts.method, path) {
        let route = *matched.handler;
        let body = if route.reads_body() {
            match read_body(body, max_body_size).await {
                Ok(bytes) => bytes,
                Err(resp) => return resp,
            }
        } else {
            Bytes::new()
        };

        let api_req = ApiRequest {
            content_type: parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            body,
        };
        let response = api::handle(route, &matched.params, api_req, state).await;
        logger::log_api_request(parts.method.as_str(), path, response.status().as_u16());
        return response;
    }

    // 5. Only reads fall through to static files
    if parts.method != Method::GET && parts.method != Method::HEAD {
        return ApiError::method_not_allowed(parts.method.as_str()).into_response();
    }

    // 6. Static files
    let static_req = StaticRequest {
        path,
        is_head: parts.method == Method::HEAD,
        if_none_match: parts
            .headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok()),
    };
    static_files::serve_public(&static_req, &state.config.http).await
}

fn is_supported_method(method: &Method) -> bool {
    [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
    .contains(method)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(parts: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = parts.headers.get(header::CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(ApiError::payload_too_large(max_body_size).into_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect at most `max_body_size` bytes of the request body
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::payload_too_large(max_body_size).into_response())
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(ApiError::internal().into_response())
        }
    }
}

/// Server name and CORS headers carried by every response
fn apply_common_headers(
    response: &mut Response<Full<Bytes>>,
    origin: Option<&HeaderValue>,
    http: &HttpConfig,
) {
    let headers = response.headers_mut();

    if let Ok(server) = HeaderValue::from_str(&http.server_name) {
        headers.insert(header::SERVER, server);
    }
    if let Some(origin) = origin {
        let allowed = origin
            .to_str()
            .is_ok_and(|o| http.allowed_origins.iter().any(|a| a == o));
        if allowed {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::EventStore;
    use hyper::StatusCode;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    struct TestServer {
        root: PathBuf,
        state: Arc<AppState>,
    }

    impl TestServer {
        async fn new() -> Self {
            let root = std::env::temp_dir().join(format!("calendar-handler-{}", uuid::Uuid::new_v4()));
            let public = root.join("public");
            std::fs::create_dir_all(&public).unwrap();
            std::fs::write(public.join("index.html"), "<!doctype html>").unwrap();

            let mut config = Config::load_from("does-not-exist/config").unwrap();
            config.http.public_dir = public.to_string_lossy().into_owned();
            config.http.allowed_origins = vec!["http://localhost:5173".to_string()];
            config.http.max_body_size = 256;
            config.logging.access_log = false;

            let store = EventStore::open(root.join("data/base.json")).await.unwrap();
            let state = AppState::new(config, Arc::new(store)).unwrap();
            Self {
                root,
                state: Arc::new(state),
            }
        }

        async fn send(&self, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
            let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
            handle_request(req, peer, Arc::clone(&self.state)).await.unwrap()
        }

        async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Full::new(Bytes::from(json.to_string()))
                }
                None => Full::new(Bytes::new()),
            };
            let resp = self.send(builder.body(body).unwrap()).await;
            let status = resp.status();
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let server = TestServer::new().await;
        let (status, body) = server.call(Method::GET, "/api", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["details"], "Server is ready to accept requests");
    }

    #[tokio::test]
    async fn test_event_lifecycle() {
        let server = TestServer::new().await;

        let (status, created) = server
            .call(
                Method::POST,
                "/api/event",
                Some(json!({"title": "Review", "start": "2024-03-15T10:00:00Z", "color": "#123456"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "fulfilled");
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["details"], format!("Event with id '{id}' was created"));

        let (status, event) = server.call(Method::GET, &format!("/api/event/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(event["title"], "Review");
        assert_eq!(event["color"], "#123456");

        let (status, updated) = server
            .call(
                Method::PUT,
                &format!("/api/event/{id}/"),
                Some(json!({"title": "Review (moved)", "allDay": true})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["details"], format!("Event with id '{id}' was modified"));
        assert_eq!(updated["id"], id.as_str());

        let (_, listed) = server.call(Method::GET, "/api/events", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["title"], "Review (moved)");
        assert_eq!(listed[0]["allDay"], true);

        let (status, deleted) = server.call(Method::DELETE, &format!("/api/event/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["details"], format!("Event with id '{id}' was deleted"));
        assert!(deleted.get("id").is_none());

        let (status, missing) = server.call(Method::GET, &format!("/api/event/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(missing["status"], "rejected");
        assert_eq!(missing["details"], format!("Event with id '{id}' not found"));
    }

    #[tokio::test]
    async fn test_unknown_event_mutations() {
        let server = TestServer::new().await;

        let (status, body) = server
            .call(Method::PUT, "/api/event/ghost", Some(json!({"title": "x"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["details"],
            "Event with id 'ghost' not found or could not be modified"
        );
        assert_eq!(body["id"], "ghost");

        let (status, body) = server.call(Method::DELETE, "/api/event/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["details"],
            "Event with id 'ghost' not found or could not be deleted"
        );
    }

    #[tokio::test]
    async fn test_create_requires_json() {
        let server = TestServer::new().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/event")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Full::new(Bytes::from("title=x")))
            .unwrap();
        let resp = server.send(req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let (status, body) = server
            .call(Method::POST, "/api/event", Some(json!({"start": "2024-03-15"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reason"], "error");
    }

    #[tokio::test]
    async fn test_range_query() {
        let server = TestServer::new().await;
        for (title, start) in [("in", "2024-03-10"), ("out", "2024-05-01")] {
            server
                .call(Method::POST, "/api/event", Some(json!({"title": title, "start": start})))
                .await;
        }

        let (status, found) = server
            .call(
                Method::POST,
                "/api/events",
                Some(json!({"startStr": "2024-03-01", "endStr": "2024-03-31"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["title"], "in");

        let (status, found) = server
            .call(Method::POST, "/api/events", Some(json!({"startStr": "soon"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found, json!([]));
    }

    #[tokio::test]
    async fn test_view_endpoint() {
        let server = TestServer::new().await;
        let (status, body) = server.call(Method::GET, "/api/view/2024/3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"]["date"], "2024-03-01");
        assert_eq!(body["state"]["view"], "month");
        assert_eq!(body["links"]["next"], "/2024/04/");
    }

    #[tokio::test]
    async fn test_options_preflight_and_cors() {
        let server = TestServer::new().await;
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/event")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = server.send(req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");

        let req = Request::builder()
            .uri("/api")
            .header(header::ORIGIN, "http://evil.example")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = server.send(req).await;
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_unrouted_write_is_405() {
        let server = TestServer::new().await;
        let (status, body) = server.call(Method::POST, "/calendar", Some(json!({}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["details"], "Unsupported method \"POST\"");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_400() {
        let server = TestServer::new().await;
        let (status, body) = server.call(Method::PATCH, "/api/event/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["details"],
            "Unsupported method \"PATCH\" or URL \"/api/event/1\""
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let server = TestServer::new().await;
        let big = "x".repeat(512);
        let (status, _) = server
            .call(Method::POST, "/api/event", Some(json!({"title": big, "start": "2024-03-15"})))
            .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/event")
            .header(header::CONTENT_LENGTH, "100000")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from("{}")))
            .unwrap();
        assert_eq!(server.send(req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let server = TestServer::new().await;
        let resp = server
            .send(Request::builder().uri("/").body(Full::new(Bytes::new())).unwrap())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::SERVER], "calendar-server");

        let (status, body) = server.call(Method::GET, "/missing.js", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["details"],
            "The requested resource /missing.js could not be found."
        );
    }
}
