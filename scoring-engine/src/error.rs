//! Error types for the scoring engine

use thiserror::Error;

/// Scoring engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid input (missing or empty required fields)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Calculation error
    #[error("Calculation error: {0}")]
    Calculation(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
