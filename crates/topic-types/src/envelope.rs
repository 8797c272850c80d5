//! Request/response records for the extract, load and retrieve stages.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::topic::{EmbeddedTopic, RetrievedTopic, TopicInfo};

/// Default number of results requested from a retriever.
pub const DEFAULT_N_RESULTS: usize = 10;

/// Documents handed to a topic extractor.
///
/// The sequence is lazy and single-pass.
pub struct TopicExtractionInput<'a> {
    documents: Box<dyn Iterator<Item = String> + Send + 'a>,
}

impl<'a> TopicExtractionInput<'a> {
    /// Wrap any sequence of document texts.
    pub fn new<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'a,
    {
        Self {
            documents: Box::new(documents.into_iter()),
        }
    }

    /// Consume the input, yielding the documents.
    pub fn into_documents(self) -> Box<dyn Iterator<Item = String> + Send + 'a> {
        self.documents
    }
}

impl fmt::Debug for TopicExtractionInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicExtractionInput").finish_non_exhaustive()
    }
}

/// Result of the extraction stage.
///
/// `T` carries extractor-specific raw output; extractors without one use the
/// default `()`. The type does not enforce that `topics` is empty when
/// `error` is set: producers must uphold that.
#[derive(Debug)]
pub struct TopicExtractionBuildOutput<T = ()> {
    /// Failure of the extraction, if any
    pub error: Option<anyhow::Error>,
    /// Extracted topics in production order
    pub topics: Vec<TopicInfo>,
    /// Raw extractor output
    pub topic_extractor_output: Option<T>,
}

impl<T> Default for TopicExtractionBuildOutput<T> {
    fn default() -> Self {
        Self {
            error: None,
            topics: Vec::new(),
            topic_extractor_output: None,
        }
    }
}

impl<T> TopicExtractionBuildOutput<T> {
    /// Successful extraction.
    pub fn success(topics: Vec<TopicInfo>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Failed extraction with no topics.
    pub fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Attach raw extractor output (builder pattern).
    pub fn with_output(mut self, output: T) -> Self {
        self.topic_extractor_output = Some(output);
        self
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A record accepted by the loading stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoadableTopic {
    Embedded(EmbeddedTopic),
    Plain(TopicInfo),
}

impl From<TopicInfo> for LoadableTopic {
    fn from(topic: TopicInfo) -> Self {
        LoadableTopic::Plain(topic)
    }
}

impl From<EmbeddedTopic> for LoadableTopic {
    fn from(topic: EmbeddedTopic) -> Self {
        LoadableTopic::Embedded(topic)
    }
}

/// Topics to persist in a sink.
///
/// The embedding function is configured on the sink, not carried here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicLoadingInput {
    pub topics: Vec<LoadableTopic>,
}

impl TopicLoadingInput {
    pub fn new<I, T>(topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<LoadableTopic>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Partition into plain and embedded records, keeping relative order.
    pub fn split(self) -> (Vec<TopicInfo>, Vec<EmbeddedTopic>) {
        let mut plain = Vec::new();
        let mut embedded = Vec::new();
        for topic in self.topics {
            match topic {
                LoadableTopic::Plain(t) => plain.push(t),
                LoadableTopic::Embedded(t) => embedded.push(t),
            }
        }
        (plain, embedded)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Parameters of a retrieval run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRetrievalRunInput {
    /// Number of results to return from the topic retriever
    #[serde(default = "default_n_results")]
    pub n_results: usize,
    /// Keyword args passed opaquely to the backend query function
    #[serde(default)]
    pub query_kwargs: Map<String, Value>,
    /// Include only topics at or below this distance
    #[serde(default)]
    pub distance_threshold: Option<f32>,
}

fn default_n_results() -> usize {
    DEFAULT_N_RESULTS
}

impl Default for TopicRetrievalRunInput {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
            query_kwargs: Map::new(),
            distance_threshold: None,
        }
    }
}

impl TopicRetrievalRunInput {
    pub fn with_n_results(mut self, n_results: usize) -> Self {
        self.n_results = n_results;
        self
    }

    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = Some(threshold);
        self
    }

    pub fn with_query_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_kwargs.insert(key.into(), value.into());
        self
    }
}

/// Result of a retrieval run.
///
/// `topics == None` means no retrieval was performed; `Some(vec![])` means a
/// retrieval ran and matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicRetrievalRunOutput {
    pub topics: Option<Vec<RetrievedTopic>>,
}

impl TopicRetrievalRunOutput {
    pub fn not_performed() -> Self {
        Self { topics: None }
    }

    pub fn performed(topics: Vec<RetrievedTopic>) -> Self {
        Self {
            topics: Some(topics),
        }
    }

    pub fn was_performed(&self) -> bool {
        self.topics.is_some()
    }

    /// Number of hits, or `None` when no retrieval ran.
    pub fn result_count(&self) -> Option<usize> {
        self.topics.as_ref().map(Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Expertise;

    #[test]
    fn test_build_output_defaults() {
        let output: TopicExtractionBuildOutput = TopicExtractionBuildOutput::default();
        assert!(output.error.is_none());
        assert!(output.topics.is_empty());
        assert!(output.topic_extractor_output.is_none());
        assert!(output.is_success());
    }

    #[test]
    fn test_build_output_error_does_not_clear_topics() {
        let mut output: TopicExtractionBuildOutput<String> =
            TopicExtractionBuildOutput::success(vec![TopicInfo::new("rust", "alice")]);
        output.error = Some(anyhow::anyhow!("model timed out"));
        assert_eq!(output.topics.len(), 1);
        assert!(!output.is_success());
    }

    #[test]
    fn test_build_output_failure_and_raw_output() {
        let failed: TopicExtractionBuildOutput<()> =
            TopicExtractionBuildOutput::failure(anyhow::anyhow!("boom"));
        assert!(failed.topics.is_empty());
        assert_eq!(failed.error.unwrap().to_string(), "boom");

        let ok = TopicExtractionBuildOutput::success(vec![]).with_output(vec!["raw".to_string()]);
        assert_eq!(ok.topic_extractor_output, Some(vec!["raw".to_string()]));
    }

    #[test]
    fn test_extraction_input_is_lazy_sequence() {
        let docs = vec!["a".to_string(), "b".to_string()];
        let input = TopicExtractionInput::new(docs);
        let collected: Vec<String> = input.into_documents().collect();
        assert_eq!(collected, vec!["a", "b"]);
    }

    #[test]
    fn test_loading_input_split_keeps_order() {
        let input = TopicLoadingInput::new(vec![
            LoadableTopic::from(TopicInfo::new("rust", "alice")),
            LoadableTopic::from(EmbeddedTopic::new(TopicInfo::new("go", "bob"), vec![1.0])),
            LoadableTopic::from(TopicInfo::new("zig", "carol")),
        ]);
        assert_eq!(input.len(), 3);

        let (plain, embedded) = input.split();
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[0].topic, "rust");
        assert_eq!(plain[1].topic, "zig");
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].topic.topic, "go");
    }

    #[test]
    fn test_loadable_topic_json_variants() {
        let plain: LoadableTopic =
            serde_json::from_str(r#"{"topic":"rust","subject":"alice","expertise":"expert"}"#)
                .unwrap();
        match plain {
            LoadableTopic::Plain(t) => assert_eq!(t.expertise, Some(Expertise::Expert)),
            other => panic!("expected plain topic, got {other:?}"),
        }

        let embedded: LoadableTopic = serde_json::from_str(
            r#"{"topic":{"topic":"rust","subject":"alice"},"embeddings":[0.5,0.5]}"#,
        )
        .unwrap();
        assert!(matches!(embedded, LoadableTopic::Embedded(_)));
    }

    #[test]
    fn test_retrieval_input_defaults() {
        let input = TopicRetrievalRunInput::default();
        assert_eq!(input.n_results, 10);
        assert!(input.query_kwargs.is_empty());
        assert!(input.distance_threshold.is_none());

        let parsed: TopicRetrievalRunInput = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, input);
    }

    #[test]
    fn test_retrieval_input_builders() {
        let input = TopicRetrievalRunInput::default()
            .with_n_results(5)
            .with_distance_threshold(0.3)
            .with_query_kwarg("where", serde_json::json!({"team": "core"}));
        assert_eq!(input.n_results, 5);
        assert_eq!(input.distance_threshold, Some(0.3));
        assert!(input.query_kwargs.contains_key("where"));
    }

    #[test]
    fn test_retrieval_output_none_vs_empty() {
        let none = TopicRetrievalRunOutput::default();
        let empty = TopicRetrievalRunOutput::performed(vec![]);
        assert!(!none.was_performed());
        assert_eq!(none.result_count(), None);
        assert!(empty.was_performed());
        assert_eq!(empty.result_count(), Some(0));
        assert_ne!(none, empty);

        let json_none = serde_json::to_string(&none).unwrap();
        let json_empty = serde_json::to_string(&empty).unwrap();
        assert_ne!(json_none, json_empty);
    }
}
