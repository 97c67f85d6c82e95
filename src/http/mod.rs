//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! calendar API and the event store.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::{check_etag_match, expires_in, file_etag, http_date};
pub use response::{build_304_response, build_file_response, build_no_content_response, StaticFile};
