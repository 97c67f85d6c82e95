// API error type
// Every failure a handler can report, rendered as a rejected `ApiResponse`

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::json_response;
use super::types::{ApiResponse, Outcome, Reason};
use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: StatusCode,
    pub message: &'static str,
    pub details: String,
    pub id: Option<String>,
}

impl ApiError {
    fn new(code: StatusCode, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            code,
            message,
            details: details.into(),
            id: None,
        }
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad request", details)
    }

    pub fn not_found(details: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", details)
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            format!("Unsupported method \"{method}\""),
        )
    }

    pub fn payload_too_large(limit: u64) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload too large",
            format!("Request body exceeds {limit} bytes"),
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An unexpected error occurred.",
        )
    }

    pub fn json_content_type() -> Self {
        Self::bad_request("Content-Type must be application/json")
    }

    pub fn invalid_json() -> Self {
        Self::bad_request("Invalid JSON")
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn to_body(&self) -> ApiResponse {
        ApiResponse {
            status: Outcome::Rejected,
            reason: Reason::Error,
            code: self.code.as_u16(),
            message: self.message.to_string(),
            details: self.details.clone(),
            id: self.id.clone(),
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        json_response(self.code, &self.to_body())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::not_found(format!("Event with id '{id}' not found")),
            StoreError::Invalid(reason) => Self::bad_request(reason),
            StoreError::Io(e) => {
                crate::logger::log_api_error(&format!("Event store I/O failed: {e}"));
                Self::internal()
            }
            StoreError::Json(e) => {
                crate::logger::log_api_error(&format!("Event store serialization failed: {e}"));
                Self::internal()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.code.as_u16(), self.message, self.details)
    }
}
