//! Event store errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Event with id '{0}' not found")]
    NotFound(String),

    #[error("Invalid event: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data file: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
