//! Calendar event model and validation

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{StoreError, StoreResult};

/// A stored calendar event
///
/// `start` and `end` keep the client's ISO-8601 text verbatim. Properties
/// the server does not interpret (colors, `groupId`, `extendedProps`, ...)
/// live in `extra` and round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Validate client-supplied fields into an event carrying `id`
    ///
    /// Any `id` among the fields is discarded in favour of the given one.
    pub fn from_fields(id: &str, mut fields: Map<String, Value>) -> StoreResult<Self> {
        fields.remove("id");

        let title = match fields.remove("title") {
            Some(Value::String(title)) if !title.trim().is_empty() => title.trim().to_string(),
            Some(Value::String(_)) => return Err(invalid("title must not be empty")),
            Some(_) => return Err(invalid("title must be a string")),
            None => return Err(invalid("title is required")),
        };

        let start = match fields.remove("start") {
            Some(Value::String(start)) => start,
            Some(_) => return Err(invalid("start must be a string")),
            None => return Err(invalid("start is required")),
        };
        let Some(start_at) = parse_event_time(&start) else {
            return Err(invalid(&format!("start '{start}' is not an ISO-8601 date")));
        };

        let end = match fields.remove("end") {
            None | Some(Value::Null) => None,
            Some(Value::String(end)) => {
                let Some(end_at) = parse_event_time(&end) else {
                    return Err(invalid(&format!("end '{end}' is not an ISO-8601 date")));
                };
                if end_at < start_at {
                    return Err(invalid("end must not be before start"));
                }
                Some(end)
            }
            Some(_) => return Err(invalid("end must be a string")),
        };

        let all_day = match fields.remove("allDay") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(all_day)) => all_day,
            Some(_) => return Err(invalid("allDay must be a boolean")),
        };

        Ok(Self {
            id: id.to_string(),
            title,
            start,
            end,
            all_day,
            extra: fields,
        })
    }

    /// Shallow-merge `patch` over this event and validate the result
    pub fn merged(&self, patch: Map<String, Value>) -> StoreResult<Self> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.extend(patch);
        Self::from_fields(&self.id, fields)
    }

    /// Inclusive check of start or end against `[from, to]`
    ///
    /// Events that fully contain the range are not counted.
    pub fn touches(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        let within = |at: Option<NaiveDateTime>| at.is_some_and(|at| at >= from && at <= to);
        within(parse_event_time(&self.start)) || within(self.end.as_deref().and_then(parse_event_time))
    }
}

fn invalid(reason: &str) -> StoreError {
    StoreError::Invalid(reason.to_string())
}

/// Parse the ISO-8601 shapes calendar clients send
///
/// Offset date-times are normalized to UTC, naive date-times are taken as
/// is, and plain dates mean midnight.
pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(at);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
