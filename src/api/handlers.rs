// Calendar API handlers module

use chrono::{Local, NaiveDate};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{Map, Value};

use super::error::ApiError;
use super::response::{empty_list, fresh_json_response, json_response};
use super::types::{ApiResponse, RangeQuery, ViewResponse};
use super::ApiRequest;
use crate::config::AppState;
use crate::logger;
use crate::routing::Params;
use crate::store::{parse_event_time, StoreError};
use crate::view::{navigation_links, resolve_view_at, ViewKind};

type ApiResult = Result<Response<Full<Bytes>>, ApiError>;

/// `GET /api`
pub fn status() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &ApiResponse::ready())
}

/// `GET /api/events`
pub async fn list_events(state: &AppState) -> Response<Full<Bytes>> {
    let events = state.store.all().await;
    fresh_json_response(StatusCode::OK, &events)
}

/// `POST /api/events` with `{startStr, endStr}`
///
/// Any failure answers `200 []`, which calendar clients treat as "nothing
/// in this range".
pub async fn query_events(req: &ApiRequest<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let range = match parse_range(req) {
        Ok(range) => range,
        Err(reason) => {
            logger::log_debug(&format!("[API] Range query rejected: {reason}"));
            return empty_list();
        }
    };

    let events = state.store.in_range(range.0, range.1).await;
    fresh_json_response(StatusCode::OK, &events)
}

fn parse_range(
    req: &ApiRequest<'_>,
) -> Result<(chrono::NaiveDateTime, chrono::NaiveDateTime), String> {
    if !req.is_json() {
        return Err("Content-Type must be application/json".to_string());
    }
    let query: RangeQuery =
        serde_json::from_slice(&req.body).map_err(|e| format!("Invalid JSON: {e}"))?;
    let start = parse_event_time(&query.start_str)
        .ok_or_else(|| format!("unparseable startStr '{}'", query.start_str))?;
    let end = parse_event_time(&query.end_str)
        .ok_or_else(|| format!("unparseable endStr '{}'", query.end_str))?;
    Ok((start, end))
}

/// `GET /api/event/:id`
pub async fn get_event(id: &str, state: &AppState) -> ApiResult {
    let event = state.store.get(id).await?;
    Ok(fresh_json_response(StatusCode::OK, &event))
}

/// `POST /api/event`
pub async fn create_event(req: &ApiRequest<'_>, state: &AppState) -> ApiResult {
    let fields = json_fields(req)?;
    let event = state.store.append(fields).await?;

    let details = format!("Event with id '{}' was created", event.id);
    Ok(fresh_json_response(
        StatusCode::OK,
        &ApiResponse::fulfilled(details, Some(event.id)),
    ))
}

/// `PUT /api/event/:id`
pub async fn update_event(id: &str, req: &ApiRequest<'_>, state: &AppState) -> ApiResult {
    let not_modified = || {
        ApiError::not_found(format!(
            "Event with id '{id}' not found or could not be modified"
        ))
        .with_id(id)
    };

    if !req.is_json() {
        return Err(ApiError::json_content_type().with_id(id));
    }
    if state.store.get(id).await.is_err() {
        return Err(not_modified());
    }

    let patch = json_fields(req).map_err(|e| e.with_id(id))?;
    match state.store.update(id, patch).await {
        Ok(_) => {
            let details = format!("Event with id '{id}' was modified");
            Ok(fresh_json_response(
                StatusCode::OK,
                &ApiResponse::fulfilled(details, Some(id.to_string())),
            ))
        }
        Err(StoreError::NotFound(_)) => Err(not_modified()),
        Err(e) => Err(ApiError::from(e).with_id(id)),
    }
}

/// `DELETE /api/event/:id`
pub async fn delete_event(id: &str, state: &AppState) -> ApiResult {
    match state.store.delete(id).await {
        Ok(()) => {
            let details = format!("Event with id '{id}' was deleted");
            Ok(fresh_json_response(
                StatusCode::OK,
                &ApiResponse::fulfilled(details, None),
            ))
        }
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found(format!(
            "Event with id '{id}' not found or could not be deleted"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// `GET /api/view[/:primary[/:secondary[/:tertiary[/:auxiliary]]]]`
pub fn resolve_view(params: &Params) -> Response<Full<Bytes>> {
    resolve_view_on(Local::now().date_naive(), params)
}

fn resolve_view_on(today: NaiveDate, params: &Params) -> Response<Full<Bytes>> {
    let segment = |name: &str| params.get(name).map(String::as_str);
    let state = resolve_view_at(
        today,
        segment("primary"),
        segment("secondary"),
        segment("tertiary"),
        segment("auxiliary"),
    );

    let view = state.view.unwrap_or(ViewKind::Month);
    let anchor = state.date.unwrap_or(today);
    let links = navigation_links(view, anchor, today);

    json_response(StatusCode::OK, &ViewResponse { state, links })
}

/// Require a JSON content type and a JSON object body
fn json_fields(req: &ApiRequest<'_>) -> Result<Map<String, Value>, ApiError> {
    if !req.is_json() {
        return Err(ApiError::json_content_type());
    }
    match serde_json::from_slice(&req.body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) | Err(_) => Err(ApiError::invalid_json()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_resolve_view_day() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let resp = resolve_view_on(
            today,
            &params(&[
                ("primary", "2024"),
                ("secondary", "3"),
                ("tertiary", "15"),
                ("auxiliary", "@930"),
            ]),
        );
        let value = body_json(resp).await;
        assert_eq!(value["state"]["date"], "2024-03-15");
        assert_eq!(value["state"]["view"], "day");
        assert_eq!(value["state"]["time"], "09:30");
        assert_eq!(value["links"]["prev"], "/2024/03/14/");
        assert_eq!(value["links"]["today"], "/2026/10/18/");
    }

    #[tokio::test]
    async fn test_resolve_view_without_segments_defaults_to_month_of_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let value = body_json(resolve_view_on(today, &Params::new())).await;
        assert_eq!(value["state"]["date"], Value::Null);
        assert_eq!(value["links"]["month"], "/2026/10/");
        assert_eq!(value["links"]["next"], "/2026/11/");
        assert_eq!(value["links"]["day"], "/2026/10/18/");
    }

    #[tokio::test]
    async fn test_resolve_view_week() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let resp = resolve_view_on(
            today,
            &params(&[("primary", "week"), ("secondary", "2"), ("tertiary", "2024")]),
        );
        let value = body_json(resp).await;
        assert_eq!(value["state"]["date"], "2024-01-08");
        assert_eq!(value["state"]["view"], "week");
        assert_eq!(value["links"]["next"], "/week/3/2024/");
    }

    #[test]
    fn test_json_fields_requires_object() {
        let req = ApiRequest {
            content_type: Some("application/json; charset=utf-8"),
            body: Bytes::from_static(b"[1,2]"),
        };
        let err = json_fields(&req).unwrap_err();
        assert_eq!(err.details, "Invalid JSON");

        let req = ApiRequest {
            content_type: Some("text/plain"),
            body: Bytes::from_static(b"{}"),
        };
        let err = json_fields(&req).unwrap_err();
        assert_eq!(err.details, "Content-Type must be application/json");
    }
}
