// API module entry
// Calendar JSON API: event CRUD, range queries and view resolution

mod error;
mod handlers;
mod response;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::logger;
use crate::routing::{Params, Router, RouterError};

// Re-export public types
pub use error::ApiError;
pub use response::{fresh_json_response, json_response};
pub use types::{ApiResponse, Outcome, RangeQuery, Reason, ViewResponse};

/// Handlers registered on the path router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    Status,
    ListEvents,
    QueryEvents,
    GetEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    ResolveView,
}

/// Request data a handler may need once the route is known
pub struct ApiRequest<'a> {
    pub content_type: Option<&'a str>,
    pub body: Bytes,
}

impl ApiRequest<'_> {
    pub fn is_json(&self) -> bool {
        self.content_type
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
    }
}

impl ApiRoute {
    /// Whether the handler reads the request body
    pub const fn reads_body(self) -> bool {
        matches!(self, Self::QueryEvents | Self::CreateEvent | Self::UpdateEvent)
    }
}

/// Register every API route, in match order
pub fn build_router() -> Result<Router<ApiRoute>, RouterError> {
    let mut router = Router::new();

    router.get("/api", ApiRoute::Status)?;
    router.get("/api/events", ApiRoute::ListEvents)?;
    router.post("/api/events", ApiRoute::QueryEvents)?;
    router.get("/api/event/:id", ApiRoute::GetEvent)?;
    router.post("/api/event", ApiRoute::CreateEvent)?;
    router.put("/api/event/:id", ApiRoute::UpdateEvent)?;
    router.delete("/api/event/:id", ApiRoute::DeleteEvent)?;

    router.get("/api/view", ApiRoute::ResolveView)?;
    router.get("/api/view/:primary", ApiRoute::ResolveView)?;
    router.get("/api/view/:primary/:secondary", ApiRoute::ResolveView)?;
    router.get("/api/view/:primary/:secondary/:tertiary", ApiRoute::ResolveView)?;
    router.get(
        "/api/view/:primary/:secondary/:tertiary/:auxiliary",
        ApiRoute::ResolveView,
    )?;

    Ok(router)
}

/// Run the handler behind `route`
pub async fn handle(
    route: ApiRoute,
    params: &Params,
    req: ApiRequest<'_>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let id = params.get("id").map_or("", String::as_str);

    let result = match route {
        ApiRoute::Status => Ok(handlers::status()),
        ApiRoute::ListEvents => Ok(handlers::list_events(state).await),
        ApiRoute::QueryEvents => Ok(handlers::query_events(&req, state).await),
        ApiRoute::GetEvent => handlers::get_event(id, state).await,
        ApiRoute::CreateEvent => handlers::create_event(&req, state).await,
        ApiRoute::UpdateEvent => handlers::update_event(id, &req, state).await,
        ApiRoute::DeleteEvent => handlers::delete_event(id, state).await,
        ApiRoute::ResolveView => Ok(handlers::resolve_view(params)),
    };

    result.unwrap_or_else(|err| {
        if err.code.is_server_error() {
            logger::log_api_error(&err.to_string());
        }
        err.into_response()
    })
}
