//! In-process topic store.
//!
//! Implements both [`TopicsSink`] and [`TopicRetriever`] over a vector of
//! records ranked by cosine distance. Each call is all-or-nothing: vectors are
//! computed and validated before any record is written.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use ulid::Ulid;

use topic_contracts::{
    compare_distance, topic_text, BackendError, EmbeddingFunction, TopicRetriever, TopicsSink,
};
use topic_types::{
    EmbeddedTopic, Embedding, Metadata, RetrievedTopic, SinkBackend, TopicInfo, TopicSinkSettings,
};

use crate::error::MemoryStoreError;
use crate::similarity::cosine_distance;

/// Query kwarg holding a metadata equality filter.
pub const WHERE_KWARG: &str = "where";

/// A topic held by the store.
#[derive(Debug, Clone)]
pub struct StoredTopic {
    /// Unique identifier (ULID)
    pub record_id: String,
    pub topic: TopicInfo,
    /// `None` when stored without a vector; such records are not searchable
    pub embedding: Option<Embedding>,
    /// When the record was last written
    pub stored_at: DateTime<Utc>,
}

/// Store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub topic_count: usize,
    /// Records with a vector
    pub embedded_count: usize,
    /// Vector dimension, declared by the embedding function or fixed by the
    /// first stored vector
    pub dimension: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct WriteCounts {
    inserted: usize,
    upgraded: usize,
    kept: usize,
}

#[derive(Default)]
struct StoreState {
    records: Vec<StoredTopic>,
    /// `(topic, subject)` -> position in `records`
    index: HashMap<(String, String), usize>,
    dimension: Option<usize>,
}

impl StoreState {
    fn check_dimensions(
        &self,
        batch: &[(TopicInfo, Option<Embedding>)],
    ) -> Result<Option<usize>, MemoryStoreError> {
        let mut dimension = self.dimension;
        for embedding in batch.iter().filter_map(|(_, e)| e.as_ref()) {
            if embedding.is_empty() {
                return Err(MemoryStoreError::EmptyEmbedding);
            }
            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(MemoryStoreError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(dimension)
    }

    /// Insert, or replace an existing `(topic, subject)` record when the new
    /// one is a strict expertise upgrade.
    fn upsert(&mut self, topic: TopicInfo, embedding: Option<Embedding>, counts: &mut WriteCounts) {
        let now = Utc::now();
        let key = (topic.topic.clone(), topic.subject.clone());
        let position = self.index.get(&key).copied();
        match position.map(|idx| &mut self.records[idx]) {
            Some(existing) if existing.topic.is_superseded_by(&topic) => {
                existing.topic = topic;
                if embedding.is_some() {
                    existing.embedding = embedding;
                }
                existing.stored_at = now;
                counts.upgraded += 1;
            }
            Some(existing) => {
                if existing.embedding.is_none() && embedding.is_some() {
                    existing.embedding = embedding;
                    existing.stored_at = now;
                }
                counts.kept += 1;
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(StoredTopic {
                    record_id: Ulid::new().to_string(),
                    topic,
                    embedding,
                    stored_at: now,
                });
                counts.inserted += 1;
            }
        }
    }
}

/// In-process topic store.
pub struct InMemoryTopicStore {
    collection: String,
    embedding_function: Option<Arc<dyn EmbeddingFunction>>,
    state: RwLock<StoreState>,
}

impl InMemoryTopicStore {
    /// Create an empty store without an embedding function.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            embedding_function: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Set the embedding function used for plain topics and queries.
    ///
    /// An empty store takes its dimension from the function.
    pub fn with_embedding_function(
        mut self,
        embedding_function: Arc<dyn EmbeddingFunction>,
    ) -> Self {
        let state = self.state.get_mut();
        if state.records.is_empty() {
            state.dimension = Some(embedding_function.dimension());
        }
        self.embedding_function = Some(embedding_function);
        self
    }

    /// Build a store from sink settings.
    pub fn from_settings(
        settings: &TopicSinkSettings,
        embedding_function: Option<Arc<dyn EmbeddingFunction>>,
    ) -> Result<Self, BackendError> {
        settings.validate().map_err(BackendError::NotConfigured)?;

        if let SinkBackend::External(name) = &settings.backend {
            return Err(BackendError::NotConfigured(format!(
                "external backend '{name}' is not bundled"
            )));
        }

        let mut store = Self::new(settings.collection.clone());
        match (&settings.embedding_model, embedding_function) {
            (Some(model), None) => {
                return Err(BackendError::NotConfigured(format!(
                    "embedding model '{model}' requested but no embedding function supplied"
                )));
            }
            (model, Some(function)) => {
                if let Some(model) = model {
                    if model != function.name() {
                        warn!(
                            requested = %model,
                            supplied = %function.name(),
                            "Embedding function does not match configured model"
                        );
                    }
                }
                store = store.with_embedding_function(function);
            }
            (None, None) => {}
        }

        info!(collection = %store.collection, "Opened in-memory topic store");
        Ok(store)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn has_embedding_function(&self) -> bool {
        self.embedding_function.is_some()
    }

    /// Snapshot of stored records in insertion order.
    pub async fn records(&self) -> Vec<StoredTopic> {
        self.state.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            topic_count: state.records.len(),
            embedded_count: state
                .records
                .iter()
                .filter(|r| r.embedding.is_some())
                .count(),
            dimension: state.dimension,
        }
    }

    async fn write_batch(
        &self,
        batch: Vec<(TopicInfo, Option<Embedding>)>,
    ) -> Result<WriteCounts, BackendError> {
        let mut state = self.state.write().await;
        let dimension = state.check_dimensions(&batch)?;
        state.dimension = dimension;

        let mut counts = WriteCounts::default();
        for (topic, embedding) in batch {
            state.upsert(topic, embedding, &mut counts);
        }
        Ok(counts)
    }
}

impl fmt::Debug for InMemoryTopicStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTopicStore")
            .field("collection", &self.collection)
            .field(
                "embedding_function",
                &self.embedding_function.as_ref().map(|function| function.name()),
            )
            .finish_non_exhaustive()
    }
}

/// Embed text and check the vector against the function's declared dimension.
fn embed_checked(function: &dyn EmbeddingFunction, text: &str) -> Result<Embedding, BackendError> {
    let embedding = function.embed(text)?;
    let expected = function.dimension();
    if embedding.len() != expected {
        return Err(MemoryStoreError::DimensionMismatch {
            expected,
            actual: embedding.len(),
        }
        .into());
    }
    Ok(embedding)
}

/// Parse the metadata filter out of query kwargs, ignoring other keys.
fn parse_filter(query_kwargs: Option<&Map<String, Value>>) -> Result<Metadata, BackendError> {
    let Some(kwargs) = query_kwargs else {
        return Ok(Metadata::new());
    };

    for key in kwargs.keys().filter(|k| k.as_str() != WHERE_KWARG) {
        debug!(key = %key, "Ignoring unsupported query kwarg");
    }

    match kwargs.get(WHERE_KWARG) {
        None => Ok(Metadata::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            BackendError::InvalidQuery(format!(
                "'{WHERE_KWARG}' must map field names to scalar values: {e}"
            ))
        }),
    }
}

#[async_trait]
impl TopicsSink for InMemoryTopicStore {
    #[instrument(skip(self, topics), fields(count = topics.len()))]
    async fn add_topics(&self, topics: &[TopicInfo]) -> Result<(), BackendError> {
        let mut batch = Vec::with_capacity(topics.len());
        for topic in topics {
            let embedding = match &self.embedding_function {
                Some(function) => Some(embed_checked(function.as_ref(), topic_text(topic))?),
                None => None,
            };
            batch.push((topic.clone(), embedding));
        }

        let counts = self.write_batch(batch).await?;
        debug!(
            collection = %self.collection,
            inserted = counts.inserted,
            upgraded = counts.upgraded,
            kept = counts.kept,
            "Stored topics"
        );
        Ok(())
    }

    #[instrument(skip(self, topics, embedding_function), fields(count = topics.len()))]
    async fn add_embedded_topics(
        &self,
        topics: &[EmbeddedTopic],
        embedding_function: Option<&dyn EmbeddingFunction>,
    ) -> Result<(), BackendError> {
        let fallback = embedding_function.or(self.embedding_function.as_deref());

        let mut batch = Vec::with_capacity(topics.len());
        for embedded in topics {
            let embedding = match (&embedded.embeddings, fallback) {
                (Some(vector), _) => vector.clone(),
                (None, Some(function)) => embed_checked(function, topic_text(&embedded.topic))?,
                (None, None) => {
                    return Err(MemoryStoreError::MissingEmbedding {
                        topic: embedded.topic.topic.clone(),
                        subject: embedded.topic.subject.clone(),
                    }
                    .into())
                }
            };
            batch.push((embedded.topic.clone(), Some(embedding)));
        }

        let counts = self.write_batch(batch).await?;
        debug!(
            collection = %self.collection,
            inserted = counts.inserted,
            upgraded = counts.upgraded,
            kept = counts.kept,
            "Stored embedded topics"
        );
        Ok(())
    }
}

#[async_trait]
impl TopicRetriever for InMemoryTopicStore {
    #[instrument(skip(self, query_kwargs))]
    async fn get_topics(
        &self,
        query: &str,
        n_results: usize,
        query_kwargs: Option<&Map<String, Value>>,
        distance_threshold: Option<f32>,
    ) -> Result<Vec<RetrievedTopic>, BackendError> {
        let filter = parse_filter(query_kwargs)?;
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let function = self
            .embedding_function
            .as_ref()
            .ok_or(MemoryStoreError::NoEmbeddingFunction)?;
        let query_vector = embed_checked(function.as_ref(), query)?;

        let state = self.state.read().await;
        if let Some(expected) = state.dimension {
            if expected != query_vector.len() {
                return Err(MemoryStoreError::DimensionMismatch {
                    expected,
                    actual: query_vector.len(),
                }
                .into());
            }
        }

        let mut hits: Vec<RetrievedTopic> = state
            .records
            .iter()
            .filter(|r| r.topic.matches_filter(&filter))
            .filter_map(|r| {
                let embedding = r.embedding.as_ref()?;
                let distance = cosine_distance(&query_vector, embedding);
                Some(RetrievedTopic::new(r.topic.clone(), distance))
            })
            .filter(|hit| distance_threshold.map_or(true, |t| hit.distance <= t))
            .collect();

        // Stable sort: ties keep insertion order
        hits.sort_by(|a, b| compare_distance(a.distance, b.distance));
        hits.truncate(n_results);

        debug!(collection = %self.collection, returned = hits.len(), "Queried topics");
        Ok(hits)
    }
}
