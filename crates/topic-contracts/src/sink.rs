//! Topics sink contract.

use async_trait::async_trait;
use topic_types::{EmbeddedTopic, TopicInfo};

use crate::embedding::EmbeddingFunction;
use crate::error::BackendError;

/// Storage backend accepting topics for later retrieval.
///
/// Failures must be returned, never swallowed. Unless an implementation
/// documents atomicity, a failed call may have persisted a prefix of the
/// batch.
#[async_trait]
pub trait TopicsSink: Send + Sync {
    /// Persist topics without embeddings.
    ///
    /// The backend decides the storage representation and may vectorize them
    /// with its own embedding function.
    async fn add_topics(&self, topics: &[TopicInfo]) -> Result<(), BackendError>;

    /// Persist topics with precomputed embeddings.
    ///
    /// `embedding_function` is only consulted for records whose vectors the
    /// backend has to compute itself.
    async fn add_embedded_topics(
        &self,
        topics: &[EmbeddedTopic],
        embedding_function: Option<&dyn EmbeddingFunction>,
    ) -> Result<(), BackendError>;
}
