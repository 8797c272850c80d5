//! # topic-types
//!
//! Shared domain types for the topic toolkit.
//!
//! This crate defines the data exchanged by the extract, load and retrieve
//! stages of a retrieval-augmented reasoning pipeline:
//! - Topics: `(topic, subject, expertise, metadata)` facts with expertise precedence
//! - Embedded and retrieved topics
//! - Stage envelopes (extraction, loading, retrieval)
//! - Loading settings
//!
//! ## Usage
//!
//! ```rust
//! use topic_types::{Expertise, TopicInfo};
//!
//! let seen = TopicInfo::new("rust", "alice").with_expertise(Expertise::Mentions);
//! let known = TopicInfo::new("rust", "alice").with_expertise(Expertise::Expert);
//! assert!(seen.is_superseded_by(&known));
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod topic;

pub use config::{SinkBackend, TopicLoadingSettings, TopicSinkSettings};
pub use envelope::{
    LoadableTopic, TopicExtractionBuildOutput, TopicExtractionInput, TopicLoadingInput,
    TopicRetrievalRunInput, TopicRetrievalRunOutput, DEFAULT_N_RESULTS,
};
pub use error::TopicsError;
pub use topic::{
    EmbeddedTopic, Embedding, Expertise, Metadata, MetadataValue, PrecedenceOutcome,
    RetrievedTopic, TopicInfo,
};
