//! Topic retriever contract.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use topic_types::{RetrievedTopic, TopicRetrievalRunInput};

use crate::error::BackendError;

/// Backend answering similarity queries over stored topics.
///
/// Implementations return at most `n_results` topics, each with
/// `distance <= distance_threshold` when a threshold is given. Ordering is
/// backend-defined but must be deterministic for identical inputs against an
/// unchanged store. Unrecognized `query_kwargs` keys must not cause failure
/// unless the backend validates strictly.
#[async_trait]
pub trait TopicRetriever: Send + Sync {
    /// Query stored topics.
    async fn get_topics(
        &self,
        query: &str,
        n_results: usize,
        query_kwargs: Option<&Map<String, Value>>,
        distance_threshold: Option<f32>,
    ) -> Result<Vec<RetrievedTopic>, BackendError>;

    /// Query using the parameters of a retrieval run.
    async fn get_topics_with(
        &self,
        query: &str,
        input: &TopicRetrievalRunInput,
    ) -> Result<Vec<RetrievedTopic>, BackendError> {
        self.get_topics(
            query,
            input.n_results,
            Some(&input.query_kwargs),
            input.distance_threshold,
        )
        .await
    }
}

/// Ascending distance order with NaN ranked after every real distance,
/// whatever its sign bit.
pub fn compare_distance(a: f32, b: f32) -> Ordering {
    let key = |d: f32| if d.is_nan() { f32::INFINITY } else { d };
    key(a).total_cmp(&key(b))
}

/// Re-apply the retrieval contract to a result list.
///
/// Drops hits above the threshold (and NaN distances when a threshold is
/// set), orders by [`compare_distance`] keeping backend order for ties, and
/// truncates to `n_results`.
pub fn enforce_contract(
    mut topics: Vec<RetrievedTopic>,
    n_results: usize,
    distance_threshold: Option<f32>,
) -> Vec<RetrievedTopic> {
    if let Some(threshold) = distance_threshold {
        topics.retain(|t| t.distance <= threshold);
    }
    topics.sort_by(|a, b| compare_distance(a.distance, b.distance));
    topics.truncate(n_results);
    topics
}

/// Wraps a retriever and guarantees the result bounds regardless of how the
/// inner backend behaves.
pub struct BoundedRetriever<R> {
    inner: R,
}

impl<R: TopicRetriever> BoundedRetriever<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R: TopicRetriever> TopicRetriever for BoundedRetriever<R> {
    async fn get_topics(
        &self,
        query: &str,
        n_results: usize,
        query_kwargs: Option<&Map<String, Value>>,
        distance_threshold: Option<f32>,
    ) -> Result<Vec<RetrievedTopic>, BackendError> {
        let raw = self
            .inner
            .get_topics(query, n_results, query_kwargs, distance_threshold)
            .await?;
        let raw_count = raw.len();
        let bounded = enforce_contract(raw, n_results, distance_threshold);

        if bounded.len() != raw_count {
            warn!(
                raw_count,
                returned = bounded.len(),
                n_results,
                "Retriever returned results outside the requested bounds"
            );
        } else {
            debug!(returned = bounded.len(), "Retriever results within bounds");
        }
        Ok(bounded)
    }
}
