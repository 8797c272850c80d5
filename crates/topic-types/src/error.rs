//! Error types for the topic toolkit.

use thiserror::Error;

/// Shared error type for topic data and settings.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
