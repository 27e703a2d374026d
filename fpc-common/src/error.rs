//! Common error types for FPC

use thiserror::Error;

/// Common result type for FPC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across FPC tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Weight table cannot produce a valid score (fatal for the run)
    #[error("Weight table error: {0}")]
    WeightTable(String),

    /// A whole category is present in one fingerprint but absent in the other
    #[error("Schema mismatch: category '{category}' in {present_in} does not exist in {missing_from}")]
    SchemaMismatch {
        category: String,
        present_in: String,
        missing_from: String,
    },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed fingerprint or weight table content
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
