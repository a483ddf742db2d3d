//! Error types for readpulse

use thiserror::Error;

/// Errors that can occur while preparing or computing analytics
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid book record: {0}")]
    InvalidBook(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for readpulse
pub type Result<T> = std::result::Result<T, AnalyticsError>;
