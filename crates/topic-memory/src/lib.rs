//! # topic-memory
//!
//! In-process topic store for the topic pipeline.
//!
//! [`InMemoryTopicStore`] implements both `TopicsSink` and `TopicRetriever`:
//! topics are upserted by `(topic, subject)` following expertise precedence,
//! and queries rank stored vectors by cosine distance. A `where` entry in the
//! query kwargs filters on metadata equality.

pub mod error;
pub mod similarity;
pub mod store;

use std::sync::Arc;

use tracing::debug;

use topic_contracts::{BackendError, EmbeddingFunction};
use topic_types::TopicLoadingSettings;

pub use error::{MemoryStoreError, BACKEND_NAME};
pub use similarity::{cosine_distance, cosine_similarity};
pub use store::{InMemoryTopicStore, StoreStats, StoredTopic, WHERE_KWARG};

/// Open the sink described by loading settings.
///
/// Returns `Ok(None)` when no sink is configured, so loading can be skipped.
pub fn open_sink(
    settings: &TopicLoadingSettings,
    embedding_function: Option<Arc<dyn EmbeddingFunction>>,
) -> Result<Option<Arc<InMemoryTopicStore>>, BackendError> {
    match &settings.topics_sink {
        Some(sink) => InMemoryTopicStore::from_settings(sink, embedding_function)
            .map(|store| Some(Arc::new(store))),
        None => {
            debug!("No topics sink configured");
            Ok(None)
        }
    }
}
