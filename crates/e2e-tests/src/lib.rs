//! End-to-end test infrastructure for the topic toolkit.
//!
//! Provides a shared TestHarness plus a deterministic embedder and a
//! line-based extractor so tests can drive extract -> load -> retrieve
//! without any model.

use std::path::PathBuf;
use std::sync::{Arc, Once};

use anyhow::Context;

use topic_contracts::{BackendError, EmbeddingFunction, Extracted, TopicExtractor};
use topic_memory::InMemoryTopicStore;
use topic_types::{Embedding, Expertise, TopicExtractionInput, TopicInfo};

/// Dimension of [`HashedBagEmbedder`] vectors.
pub const TEST_DIMENSION: usize = 256;

static TRACING: Once = Once::new();

/// Install a fmt subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// 64-bit FNV-1a. Fixed across toolchains, unlike `DefaultHasher`.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

/// Bag-of-words embedder hashing each lowercase word into a fixed bucket.
///
/// Texts sharing words land close together; identical texts have distance 0.
pub struct HashedBagEmbedder;

impl HashedBagEmbedder {
    /// Bucket a word lands in.
    pub fn bucket(word: &str) -> usize {
        (fnv1a(word.to_lowercase().as_bytes()) % TEST_DIMENSION as u64) as usize
    }
}

impl EmbeddingFunction for HashedBagEmbedder {
    fn name(&self) -> &str {
        "hashed-bag"
    }

    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }

    fn embed(&self, text: &str) -> Result<Embedding, BackendError> {
        let mut vector = vec![0.0; TEST_DIMENSION];
        for word in text.split_whitespace() {
            vector[Self::bucket(word)] += 1.0;
        }
        Ok(vector)
    }
}

/// Extracts one topic per line of the form `subject | topic | expertise`.
///
/// Blank lines are skipped and the expertise column is optional. Any other
/// line fails the whole extraction. Raw output is the number of documents read.
pub struct PipeExtractor;

impl TopicExtractor for PipeExtractor {
    type Output = usize;

    fn extract(&self, input: TopicExtractionInput<'_>) -> anyhow::Result<Extracted<usize>> {
        let mut topics = Vec::new();
        let mut documents = 0;
        for doc in input.into_documents() {
            documents += 1;
            for line in doc.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let columns: Vec<&str> = line.split('|').map(str::trim).collect();
                let info = match columns.as_slice() {
                    [subject, topic] => TopicInfo::new(*topic, *subject),
                    [subject, topic, expertise] => {
                        let expertise: Expertise = expertise
                            .parse()
                            .with_context(|| format!("bad expertise in line: {line}"))?;
                        TopicInfo::new(*topic, *subject).with_expertise(expertise)
                    }
                    _ => anyhow::bail!("malformed topic line: {line}"),
                };
                topics.push(info);
            }
        }
        Ok(Extracted::new(topics).with_raw(documents))
    }
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Store wired to [`HashedBagEmbedder`]
    pub store: Arc<InMemoryTopicStore>,
    pub embedder: Arc<HashedBagEmbedder>,
}

impl TestHarness {
    /// Create a new test harness with temp directory and an empty store.
    pub fn new() -> Self {
        init_tracing();
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let embedder = Arc::new(HashedBagEmbedder);
        let store = Arc::new(
            InMemoryTopicStore::new("e2e-topics").with_embedding_function(embedder.clone()),
        );

        Self {
            _temp_dir: temp_dir,
            store,
            embedder,
        }
    }

    /// Write a settings file into the harness temp dir and return its path.
    pub fn write_settings(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self._temp_dir.path().join(file_name);
        std::fs::write(&path, contents).expect("Failed to write settings file");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Documents about four agents, with repeated facts at different expertise.
pub fn sample_documents() -> Vec<String> {
    vec![
        "alice | rust async | mentions\nbob | python data | knowledge".to_string(),
        "alice | rust async | expert\ncarol | cooking pasta".to_string(),
        "bob | python data | mentions\ncarol | cooking bread | knowledge\ndave | rust macros"
            .to_string(),
    ]
}
