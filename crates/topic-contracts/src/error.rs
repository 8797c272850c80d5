//! Backend error types.

use thiserror::Error;

/// Errors surfaced by sinks, retrievers and embedding functions.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Embedding computation failed or was impossible
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Query rejected by the backend
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// No usable backend for the requested settings
    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    /// Failure specific to a named backend
    #[error("{backend} backend error: {source}")]
    Backend {
        backend: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BackendError {
    /// Wrap a backend-specific failure.
    pub fn backend(
        backend: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BackendError::Backend {
            backend: backend.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_backend_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = BackendError::backend("chroma", io);
        assert_eq!(err.to_string(), "chroma backend error: refused");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_backend_error_from_message() {
        let err = BackendError::backend("qdrant", "duplicate key: t-1");
        assert!(err.to_string().contains("duplicate key"));
    }
}
