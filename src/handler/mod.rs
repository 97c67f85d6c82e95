//! Request handler module
//!
//! Responsible for request routing dispatch: API routes first, then the
//! calendar client's static files.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
