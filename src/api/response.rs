// API response utility functions module

use crate::http::{http_date, response::log_build_error};
use crate::logger;
use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{header, Response, StatusCode};
use serde::Serialize;

const INTERNAL_ERROR_BODY: &str = r#"{"status":"rejected","reason":"error","code":500,"message":"Internal Server Error","details":"An unexpected error occurred."}"#;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return raw_json(StatusCode::INTERNAL_SERVER_ERROR, Bytes::from(INTERNAL_ERROR_BODY));
        }
    };
    raw_json(status, Bytes::from(json))
}

/// JSON response stamped with `Expires: <now>`, so clients refetch
pub fn fresh_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let mut resp = json_response(status, body);
    if let Ok(value) = http_date(Utc::now()).parse() {
        resp.headers_mut().insert(header::EXPIRES, value);
    }
    resp
}

/// `200 []`, the answer list endpoints give when anything goes wrong
pub fn empty_list() -> Response<Full<Bytes>> {
    raw_json(StatusCode::OK, Bytes::from_static(b"[]"))
}

fn raw_json(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let resp = json_response(StatusCode::CREATED, &serde_json::json!({"a": 1}));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "7");
        assert!(!resp.headers().contains_key(header::EXPIRES));
    }

    #[test]
    fn test_fresh_json_response_sets_expires() {
        let resp = fresh_json_response(StatusCode::OK, &Vec::<u8>::new());
        assert!(resp.headers()[header::EXPIRES]
            .to_str()
            .unwrap()
            .ends_with(" GMT"));
    }

    #[test]
    fn test_empty_list() {
        let resp = empty_list();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "2");
    }
}
