//! Topic extractor contract.

use tracing::{debug, warn};

use topic_types::{TopicExtractionBuildOutput, TopicExtractionInput, TopicInfo};

/// Topics produced by a successful extraction.
#[derive(Debug, Clone)]
pub struct Extracted<T> {
    pub topics: Vec<TopicInfo>,
    /// Raw extractor output, if the extractor has any
    pub raw: Option<T>,
}

impl<T> Extracted<T> {
    pub fn new(topics: Vec<TopicInfo>) -> Self {
        Self { topics, raw: None }
    }

    pub fn with_raw(mut self, raw: T) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Trait for extraction backends turning documents into topics.
pub trait TopicExtractor: Send + Sync {
    /// Extractor-specific raw output carried in the build output.
    type Output;

    /// Extract topics from the documents.
    fn extract(&self, input: TopicExtractionInput<'_>) -> anyhow::Result<Extracted<Self::Output>>;

    /// Run extraction and package the result.
    ///
    /// Failures are captured in `error` with `topics` left empty; they are
    /// never raised past this boundary.
    fn build(&self, input: TopicExtractionInput<'_>) -> TopicExtractionBuildOutput<Self::Output> {
        match self.extract(input) {
            Ok(extracted) => {
                debug!(count = extracted.topics.len(), "Extracted topics");
                TopicExtractionBuildOutput {
                    error: None,
                    topics: extracted.topics,
                    topic_extractor_output: extracted.raw,
                }
            }
            Err(e) => {
                warn!(error = %e, "Topic extraction failed");
                TopicExtractionBuildOutput::failure(e)
            }
        }
    }
}
