//! Calendar server
//!
//! Stores calendar events in a JSON file, serves them over a small JSON API
//! and resolves bookmarkable calendar URLs into view state.

pub mod api;
pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod store;
pub mod view;
