//! # topic-contracts
//!
//! Interfaces that extraction, storage and retrieval backends implement to
//! plug into the topic pipeline.
//!
//! ## Core Components
//!
//! - [`TopicsSink`]: persists topics, with or without embeddings
//! - [`TopicRetriever`]: answers proximity queries with ranked topics
//! - [`ContentProvider`]: yields document text for extraction
//! - [`TopicExtractor`]: turns documents into topics
//! - [`EmbeddingFunction`]: vectorizes text for sinks and retrievers
//!
//! Stage runners ([`load_topics`], [`run_retrieval`], [`extract_from_provider`])
//! connect the envelopes from `topic-types` to these contracts, and
//! [`merge_topics`] resolves duplicate facts by expertise precedence.

pub mod embedding;
pub mod error;
pub mod extractor;
pub mod merge;
pub mod provider;
pub mod retriever;
pub mod sink;
pub mod stages;

pub use embedding::{topic_text, EmbeddingFunction};
pub use error::BackendError;
pub use extractor::{Extracted, TopicExtractor};
pub use merge::merge_topics;
pub use provider::{ContentProvider, StaticContentProvider};
pub use retriever::{compare_distance, enforce_contract, BoundedRetriever, TopicRetriever};
pub use sink::TopicsSink;
pub use stages::{
    extract_from_provider, load_topics, maybe_run_retrieval, run_retrieval, LoadReport,
};
