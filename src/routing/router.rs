//! Method + path pattern router
//!
//! Patterns use `:name` segments for captures, e.g. `/api/event/:id`.
//! Routes are tried in registration order and the first match wins. The
//! table is append-only: it is filled once at startup and only read after.

use hyper::Method;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

/// Captured path parameters keyed by segment name
pub type Params = HashMap<String, String>;

/// Errors raised while registering a route
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Route pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    #[error("Route pattern '{pattern}' does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

struct Route<H> {
    method: Method,
    matcher: Regex,
    keys: Vec<String>,
    handler: H,
}

/// A successful dispatch
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub handler: &'a H,
    pub params: Params,
}

/// Ordered route table, generic over the handler type
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    pub const fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register `handler` for `method` requests matching `pattern`
    pub fn register(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouterError> {
        let (matcher, keys) = compile_pattern(pattern)?;
        self.routes.push(Route {
            method,
            matcher,
            keys,
            handler,
        });
        Ok(())
    }

    pub fn get(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.register(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.register(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.register(Method::PUT, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.register(Method::DELETE, pattern, handler)
    }

    /// Find the first route matching `method` exactly and the normalized `path`
    pub fn dispatch(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        let path = normalize_path(path);

        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                let captures = route.matcher.captures(path)?;
                let params = route
                    .keys
                    .iter()
                    .zip(captures.iter().skip(1))
                    .filter_map(|(key, value)| Some((key.clone(), value?.as_str().to_string())))
                    .collect();
                Some(RouteMatch {
                    handler: &route.handler,
                    params,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strip one trailing slash, except from the root path
pub fn normalize_path(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    path.strip_suffix('/').unwrap_or(path)
}

/// Compile a `:name` pattern into an anchored matcher and its ordered keys
fn compile_pattern(pattern: &str) -> Result<(Regex, Vec<String>), RouterError> {
    if !pattern.starts_with('/') {
        return Err(RouterError::MissingLeadingSlash(pattern.to_string()));
    }

    let mut source = String::from("^");
    let mut keys = Vec::new();
    let mut literal = String::new();
    let mut chars = normalize_path(pattern).chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' {
            literal.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if !(next.is_ascii_alphanumeric() || next == '_') {
                break;
            }
            name.push(next);
            chars.next();
        }

        if name.is_empty() {
            literal.push(c);
            continue;
        }

        source.push_str(&regex::escape(&literal));
        literal.clear();
        source.push_str("([^/]+)");
        keys.push(name);
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');

    let matcher = Regex::new(&source).map_err(|source| RouterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok((matcher, keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_router() -> Router<&'static str> {
        let mut router = Router::new();
        router.get("/api", "status").unwrap();
        router.get("/api/events", "list").unwrap();
        router.get("/api/event/:id", "get").unwrap();
        router.put("/api/event/:id", "update").unwrap();
        router.delete("/api/event/:id", "delete").unwrap();
        router.post("/api/event", "create").unwrap();
        router
    }

    #[test]
    fn test_named_capture() {
        let router = event_router();
        let m = router.dispatch(&Method::GET, "/api/event/42").unwrap();
        assert_eq!(*m.handler, "get");
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn test_method_mismatch_is_no_match() {
        let router = event_router();
        assert!(router.dispatch(&Method::POST, "/api/event/42").is_none());
        assert!(router.dispatch(&Method::HEAD, "/api/event/42").is_none());
    }

    #[test]
    fn test_method_selects_route() {
        let router = event_router();
        assert_eq!(*router.dispatch(&Method::PUT, "/api/event/7").unwrap().handler, "update");
        assert_eq!(*router.dispatch(&Method::DELETE, "/api/event/7").unwrap().handler, "delete");
        assert_eq!(*router.dispatch(&Method::POST, "/api/event").unwrap().handler, "create");
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let router = event_router();
        let m = router.dispatch(&Method::GET, "/api/event/42/").unwrap();
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
        assert!(router.dispatch(&Method::GET, "/api/").is_some());
    }

    #[test]
    fn test_pattern_trailing_slash_is_normalized() {
        let mut router = Router::new();
        router.get("/api/events/", ()).unwrap();
        assert!(router.dispatch(&Method::GET, "/api/events").is_some());
    }

    #[test]
    fn test_anchored_match() {
        let router = event_router();
        assert!(router.dispatch(&Method::GET, "/api/event/42/extra").is_none());
        assert!(router.dispatch(&Method::GET, "/v2/api/events").is_none());
        assert!(router.dispatch(&Method::GET, "/api/event/").is_none());
        assert!(router.dispatch(&Method::GET, "/api/eventsx").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let mut router = Router::new();
        router.get("/api/event/:id", "by_id").unwrap();
        router.get("/api/event/latest", "latest").unwrap();
        let m = router.dispatch(&Method::GET, "/api/event/latest").unwrap();
        assert_eq!(*m.handler, "by_id");
    }

    #[test]
    fn test_root_path() {
        let mut router = Router::new();
        router.get("/", "root").unwrap();
        assert!(router.dispatch(&Method::GET, "/").is_some());
        assert!(router.dispatch(&Method::GET, "/index").is_none());
    }

    #[test]
    fn test_multiple_captures_in_order() {
        let mut router = Router::new();
        router.get("/api/view/:primary/:secondary", ()).unwrap();
        let m = router.dispatch(&Method::GET, "/api/view/week/2").unwrap();
        assert_eq!(m.params.get("primary").map(String::as_str), Some("week"));
        assert_eq!(m.params.get("secondary").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let mut router = Router::new();
        router.get("/:x/:x", ()).unwrap();
        let m = router.dispatch(&Method::GET, "/first/second").unwrap();
        assert_eq!(m.params.get("x").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let mut router = Router::new();
        router.get("/calendar.ics", ()).unwrap();
        assert!(router.dispatch(&Method::GET, "/calendar.ics").is_some());
        assert!(router.dispatch(&Method::GET, "/calendarxics").is_none());
    }

    #[test]
    fn test_bare_colon_is_literal() {
        let mut router = Router::new();
        router.get("/v1/discovery:", ()).unwrap();
        assert!(router.dispatch(&Method::GET, "/v1/discovery:").is_some());
    }

    #[test]
    fn test_pattern_must_start_with_slash() {
        let mut router: Router<()> = Router::new();
        let err = router.get("api/events", ()).unwrap_err();
        assert!(matches!(err, RouterError::MissingLeadingSlash(_)));
        assert!(router.is_empty());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/api/"), "/api");
        assert_eq!(normalize_path("/api"), "/api");
    }
}
