use thiserror::Error;

/// Failures at the IO, configuration and session boundary.
///
/// Registry and coordinator operations never fail; only loading files, validating
/// configuration and feeding a closed session do.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("tracking session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, TrackingError>;
