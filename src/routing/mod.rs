//! Routing module
//!
//! A minimal method + path pattern router. Patterns carry `:name` captures,
//! matching is first-match-wins in registration order, and a miss is an
//! ordinary `None` the caller turns into a fallback.

mod router;

pub use router::{normalize_path, Params, RouteMatch, Router, RouterError};
