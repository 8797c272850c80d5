//! In-memory store error types.

use thiserror::Error;

use topic_contracts::BackendError;

/// Backend name reported in [`BackendError::Backend`].
pub const BACKEND_NAME: &str = "in-memory";

/// Errors that can occur in the in-memory topic store.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// Vector length differs from the store's dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No vector given and no embedding function to compute one
    #[error("Missing embedding for topic '{topic}' of subject '{subject}'")]
    MissingEmbedding { topic: String, subject: String },

    /// Query needs an embedding function the store does not have
    #[error("No embedding function configured")]
    NoEmbeddingFunction,

    /// Empty vectors cannot be searched
    #[error("Empty embedding")]
    EmptyEmbedding,
}

impl From<MemoryStoreError> for BackendError {
    fn from(err: MemoryStoreError) -> Self {
        BackendError::backend(BACKEND_NAME, err)
    }
}
