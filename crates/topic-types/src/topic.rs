//! Topic value types and expertise precedence.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TopicsError;

/// An embedding vector.
pub type Embedding = Vec<f32>;

/// Free-form filter fields attached to a topic.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// How strongly a subject is known to relate to a topic.
///
/// Variant order is the precedence scale: `Mentions < Knowledge < Expert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expertise {
    /// The subject merely mentions the topic
    Mentions,
    /// The subject has working knowledge of the topic
    Knowledge,
    /// The subject is an expert on the topic
    Expert,
}

impl Expertise {
    /// Wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Expertise::Mentions => "mentions",
            Expertise::Knowledge => "knowledge",
            Expertise::Expert => "expert",
        }
    }
}

impl fmt::Display for Expertise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expertise {
    type Err = TopicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mentions" => Ok(Expertise::Mentions),
            "knowledge" => Ok(Expertise::Knowledge),
            "expert" => Ok(Expertise::Expert),
            other => Err(TopicsError::InvalidInput(format!(
                "unknown expertise level: {other}"
            ))),
        }
    }
}

/// A scalar metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    /// Equality for filtering. Numbers compare by value across `Int` and
    /// `Float`, so `2024` matches `2024.0`.
    pub fn matches(&self, other: &MetadataValue) -> bool {
        match (self, other) {
            (MetadataValue::Int(a), MetadataValue::Float(b))
            | (MetadataValue::Float(b), MetadataValue::Int(a)) => *a as f64 == *b,
            _ => self == other,
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

/// Result of comparing a topic against an arbitrary value under expertise
/// precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecedenceOutcome {
    /// The left-hand topic is a strict expertise downgrade of the other
    Less,
    /// Same type, but no strict upgrade (different key, equal, reversed or
    /// absent expertise)
    NotLess,
    /// The other value is not a `TopicInfo`
    Unsupported,
}

impl PrecedenceOutcome {
    /// `true` only for [`PrecedenceOutcome::Less`].
    pub fn is_less(&self) -> bool {
        matches!(self, PrecedenceOutcome::Less)
    }

    /// `true` when the comparison is defined.
    pub fn is_supported(&self) -> bool {
        !matches!(self, PrecedenceOutcome::Unsupported)
    }
}

/// A fact that `subject` relates to `topic` at some expertise level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    /// Text that describes the topic
    pub topic: String,
    /// Level of expertise the subject has on the topic
    #[serde(default)]
    pub expertise: Option<Expertise>,
    /// Entity holding the knowledge, e.g. an agent name
    pub subject: String,
    /// Fields usable to filter topics during retrieval
    #[serde(default)]
    pub metadata: Metadata,
}

impl TopicInfo {
    /// Create a topic with no expertise and empty metadata.
    pub fn new(topic: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            expertise: None,
            subject: subject.into(),
            metadata: Metadata::new(),
        }
    }

    /// Set the expertise level (builder pattern).
    pub fn with_expertise(mut self, expertise: Expertise) -> Self {
        self.expertise = Some(expertise);
        self
    }

    /// Add a metadata field (builder pattern).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Identity used for precedence and deduplication.
    pub fn key(&self) -> (&str, &str) {
        (&self.topic, &self.subject)
    }

    /// Whether `other` is a strict expertise upgrade of this fact.
    ///
    /// Only defined for the same `(topic, subject)`; absent expertise on
    /// either side is never an upgrade.
    pub fn is_superseded_by(&self, other: &TopicInfo) -> bool {
        if self.key() != other.key() {
            return false;
        }
        match (self.expertise, other.expertise) {
            (Some(mine), Some(theirs)) => mine < theirs,
            _ => false,
        }
    }

    /// Whether this fact is a strict expertise upgrade of `other`.
    pub fn supersedes(&self, other: &TopicInfo) -> bool {
        other.is_superseded_by(self)
    }

    /// Precedence comparison against a value of any type.
    pub fn precedence_lt(&self, other: &dyn Any) -> PrecedenceOutcome {
        match other.downcast_ref::<TopicInfo>() {
            Some(other) if self.is_superseded_by(other) => PrecedenceOutcome::Less,
            Some(_) => PrecedenceOutcome::NotLess,
            None => PrecedenceOutcome::Unsupported,
        }
    }

    /// Whether every entry of `filter` is present with an equal value.
    pub fn matches_filter(&self, filter: &Metadata) -> bool {
        filter
            .iter()
            .all(|(key, expected)| {
                self.metadata
                    .get(key)
                    .is_some_and(|value| value.matches(expected))
            })
    }
}

/// A topic after vectorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedTopic {
    pub topic: TopicInfo,
    #[serde(default)]
    pub embeddings: Option<Embedding>,
}

impl EmbeddedTopic {
    pub fn new(topic: TopicInfo, embeddings: Embedding) -> Self {
        Self {
            topic,
            embeddings: Some(embeddings),
        }
    }

    /// Wrap a topic whose vector is left for the sink to compute.
    pub fn without_embeddings(topic: TopicInfo) -> Self {
        Self {
            topic,
            embeddings: None,
        }
    }
}

/// A search hit. Lower distance conventionally means a closer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedTopic {
    pub topic: TopicInfo,
    pub distance: f32,
}

impl RetrievedTopic {
    pub fn new(topic: TopicInfo, distance: f32) -> Self {
        Self { topic, distance }
    }
}
