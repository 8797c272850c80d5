//! Embedding function trait.
//!
//! Sinks hold an embedding function to vectorize topics and queries they were
//! not given vectors for.

use topic_types::{Embedding, TopicInfo};

use crate::error::BackendError;

/// Trait for embedding functions.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
pub trait EmbeddingFunction: Send + Sync {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    fn name(&self) -> &str;

    /// Embedding dimension
    fn dimension(&self) -> usize;

    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, BackendError>;

    /// Generate embeddings for multiple texts (batch).
    /// Default implementation calls embed() for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, BackendError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Text a topic is embedded from.
pub fn topic_text(topic: &TopicInfo) -> &str {
    &topic.topic
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedder;

    impl EmbeddingFunction for LengthEmbedder {
        fn name(&self) -> &str {
            "length"
        }

        fn dimension(&self) -> usize {
            1
        }

        fn embed(&self, text: &str) -> Result<Embedding, BackendError> {
            if text.is_empty() {
                return Err(BackendError::Embedding("empty text".to_string()));
            }
            Ok(vec![text.len() as f32])
        }
    }

    #[test]
    fn test_embed_batch_default() {
        let embedder = LengthEmbedder;
        let vectors = embedder.embed_batch(&["a", "abc"]).unwrap();
        assert_eq!(vectors, vec![vec![1.0], vec![3.0]]);
    }

    #[test]
    fn test_embed_batch_propagates_error() {
        let embedder = LengthEmbedder;
        assert!(embedder.embed_batch(&["a", ""]).is_err());
    }

    #[test]
    fn test_topic_text_uses_topic_label() {
        let topic = TopicInfo::new("vector search", "alice");
        assert_eq!(topic_text(&topic), "vector search");
    }
}
