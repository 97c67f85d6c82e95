// API request/response types

use serde::{Deserialize, Serialize};

use crate::view::{NavLinks, ViewState};

/// Outcome tag of an `ApiResponse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ready,
    Fulfilled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Success,
    Error,
}

/// Result envelope for status, mutation and error responses
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: Outcome,
    pub reason: Reason,
    pub code: u16,
    pub message: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ApiResponse {
    /// Successful mutation of the event `id`
    pub fn fulfilled(details: String, id: Option<String>) -> Self {
        Self {
            status: Outcome::Fulfilled,
            reason: Reason::Success,
            code: 200,
            message: "OK".to_string(),
            details,
            id,
        }
    }

    pub fn ready() -> Self {
        Self {
            status: Outcome::Ready,
            reason: Reason::Success,
            code: 200,
            message: "OK".to_string(),
            details: "Server is ready to accept requests".to_string(),
            id: None,
        }
    }
}

/// Body of `POST /api/events`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_str: String,
    pub end_str: String,
}

/// Body of `GET /api/view/...`
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub state: ViewState,
    pub links: NavLinks,
}
