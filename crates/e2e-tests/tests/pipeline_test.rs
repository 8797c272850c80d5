//! End-to-end pipeline tests for the topic toolkit.
//!
//! Extract from a provider, merge by expertise precedence, load into the
//! in-memory store, then retrieve within the requested bounds.

use pretty_assertions::assert_eq;
use serde_json::json;

use e2e_tests::{sample_documents, HashedBagEmbedder, PipeExtractor, TestHarness};
use topic_contracts::{
    extract_from_provider, load_topics, maybe_run_retrieval, merge_topics, run_retrieval,
    BoundedRetriever, ContentProvider, EmbeddingFunction, LoadReport, StaticContentProvider,
    TopicRetriever, TopicsSink,
};
use topic_memory::{InMemoryTopicStore, WHERE_KWARG};
use topic_types::{
    EmbeddedTopic, Expertise, LoadableTopic, TopicInfo, TopicLoadingInput,
    TopicRetrievalRunInput,
};

/// Full pipeline: provider -> extractor -> merge -> sink -> retriever.
#[tokio::test]
async fn test_full_pipeline_extract_merge_load_retrieve() {
    let harness = TestHarness::new();
    let provider = StaticContentProvider::new(sample_documents());

    let build = extract_from_provider(&PipeExtractor, &provider);
    assert!(build.is_success());
    assert_eq!(build.topics.len(), 7);
    assert_eq!(build.topic_extractor_output, Some(3));

    let merged = merge_topics(build.topics);
    assert_eq!(merged.len(), 5);
    let alice = merged
        .iter()
        .find(|t| t.subject == "alice")
        .expect("alice topic survives merge");
    assert_eq!(alice.expertise, Some(Expertise::Expert));
    let bob = merged
        .iter()
        .find(|t| t.subject == "bob")
        .expect("bob topic survives merge");
    assert_eq!(bob.expertise, Some(Expertise::Knowledge));

    let report = load_topics(harness.store.as_ref(), TopicLoadingInput::new(merged), None)
        .await
        .unwrap();
    assert_eq!(report, LoadReport { plain: 5, embedded: 0 });
    assert_eq!(harness.store.len().await, 5);

    let input = TopicRetrievalRunInput::default()
        .with_n_results(5)
        .with_distance_threshold(0.3);
    let output = run_retrieval(harness.store.as_ref(), "rust async", &input)
        .await
        .unwrap();
    let topics = output.topics.expect("retrieval was performed");

    assert!(!topics.is_empty());
    assert!(topics.len() <= 5);
    assert!(topics.iter().all(|t| t.distance <= 0.3));
    assert_eq!(topics[0].topic.subject, "alice");
    assert_eq!(topics[0].topic.expertise, Some(Expertise::Expert));
}

/// Retrieval never exceeds n_results or the distance threshold.
#[tokio::test]
async fn test_retrieval_bounds_with_many_matches() {
    let harness = TestHarness::new();
    let topics: Vec<TopicInfo> = (0..20)
        .map(|i| TopicInfo::new("rust async", format!("agent-{i}")))
        .chain((0..5).map(|i| TopicInfo::new("gardening tomatoes", format!("grower-{i}"))))
        .collect();
    harness
        .store
        .add_topics(&topics)
        .await
        .unwrap();

    let input = TopicRetrievalRunInput::default()
        .with_n_results(5)
        .with_distance_threshold(0.3);
    let hits = harness
        .store
        .get_topics_with("rust async", &input)
        .await
        .unwrap();

    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|h| h.distance <= 0.3));
    let subjects: Vec<&str> = hits.iter().map(|h| h.topic.subject.as_str()).collect();
    assert_eq!(
        subjects,
        vec!["agent-0", "agent-1", "agent-2", "agent-3", "agent-4"]
    );

    let again = harness
        .store
        .get_topics_with("rust async", &input)
        .await
        .unwrap();
    assert_eq!(hits, again);
}

/// "No retrieval performed" stays distinct from "performed, no matches".
#[tokio::test]
async fn test_no_retriever_vs_empty_result() {
    let harness = TestHarness::new();
    let input = TopicRetrievalRunInput::default();

    let skipped = maybe_run_retrieval::<InMemoryTopicStore>(None, "rust", &input)
        .await
        .unwrap();
    assert!(!skipped.was_performed());
    assert_eq!(skipped.result_count(), None);

    let empty = maybe_run_retrieval(Some(harness.store.as_ref()), "rust", &input)
        .await
        .unwrap();
    assert!(empty.was_performed());
    assert_eq!(empty.result_count(), Some(0));

    harness
        .store
        .add_topics(&[TopicInfo::new("cooking pasta", "carol")])
        .await
        .unwrap();
    let strict = TopicRetrievalRunInput::default().with_distance_threshold(0.0);
    let none_close = maybe_run_retrieval(Some(harness.store.as_ref()), "rust", &strict)
        .await
        .unwrap();
    assert_eq!(none_close.result_count(), Some(0));
}

/// Plain and embedded topics in one loading input reach the right sink calls.
#[tokio::test]
async fn test_mixed_loading_input() {
    let harness = TestHarness::new();
    let precomputed = harness.embedder.embed("cooking pasta").unwrap();

    let input = TopicLoadingInput::new(vec![
        LoadableTopic::from(TopicInfo::new("rust async", "alice")),
        LoadableTopic::from(EmbeddedTopic::new(
            TopicInfo::new("cooking pasta", "carol"),
            precomputed,
        )),
        LoadableTopic::from(EmbeddedTopic::without_embeddings(TopicInfo::new(
            "python data",
            "bob",
        ))),
    ]);

    let report = load_topics(harness.store.as_ref(), input, Some(&HashedBagEmbedder))
        .await
        .unwrap();
    assert_eq!(report, LoadReport { plain: 1, embedded: 2 });

    let stats = harness.store.stats().await;
    assert_eq!(stats.topic_count, 3);
    assert_eq!(stats.embedded_count, 3);

    let hits = harness
        .store
        .get_topics("python data", 1, None, None)
        .await
        .unwrap();
    assert_eq!(hits[0].topic.subject, "bob");
}

/// Metadata filters travel through query kwargs; unknown kwargs are ignored.
#[tokio::test]
async fn test_where_filter_through_run_input() {
    let harness = TestHarness::new();
    harness
        .store
        .add_topics(&[
            TopicInfo::new("rust async", "alice").with_metadata("team", "core"),
            TopicInfo::new("rust async", "bob").with_metadata("team", "infra"),
            TopicInfo::new("rust async", "dave").with_metadata("team", "core"),
        ])
        .await
        .unwrap();

    let input = TopicRetrievalRunInput::default()
        .with_query_kwarg(WHERE_KWARG, json!({"team": "core"}))
        .with_query_kwarg("include", json!(["distances"]));
    let output = run_retrieval(harness.store.as_ref(), "rust async", &input)
        .await
        .unwrap();

    let subjects: Vec<String> = output
        .topics
        .unwrap()
        .into_iter()
        .map(|t| t.topic.subject)
        .collect();
    assert_eq!(subjects, vec!["alice".to_string(), "dave".to_string()]);
}

/// Re-loading lower-expertise duplicates leaves the stronger fact in place.
#[tokio::test]
async fn test_reload_respects_precedence() {
    let harness = TestHarness::new();
    let provider = StaticContentProvider::new(sample_documents());
    let build = extract_from_provider(&PipeExtractor, &provider);

    // Load unmerged: the store applies precedence itself
    load_topics(
        harness.store.as_ref(),
        TopicLoadingInput::new(build.topics),
        None,
    )
    .await
    .unwrap();

    let records = harness.store.records().await;
    assert_eq!(records.len(), 5);
    let alice = records
        .iter()
        .find(|r| r.topic.subject == "alice")
        .unwrap();
    assert_eq!(alice.topic.expertise, Some(Expertise::Expert));
}

/// A restartable provider yields the same documents on every pass.
#[test]
fn test_restartable_provider_extracts_twice() {
    let provider = StaticContentProvider::new(sample_documents());
    assert!(provider.is_restartable());

    let first = extract_from_provider(&PipeExtractor, &provider);
    let second = extract_from_provider(&PipeExtractor, &provider);
    assert_eq!(first.topics, second.topics);
}

/// The bounding wrapper is transparent over a well-behaved backend.
#[tokio::test]
async fn test_bounded_store_matches_raw_store() {
    let store = InMemoryTopicStore::new("bounded")
        .with_embedding_function(std::sync::Arc::new(HashedBagEmbedder));
    store
        .add_topics(&[
            TopicInfo::new("rust async", "alice"),
            TopicInfo::new("rust macros", "dave"),
            TopicInfo::new("cooking pasta", "carol"),
        ])
        .await
        .unwrap();
    let raw = store.get_topics("rust", 2, None, None).await.unwrap();

    let bounded = BoundedRetriever::new(store);
    let wrapped = bounded.get_topics("rust", 2, None, None).await.unwrap();
    assert_eq!(raw, wrapped);
    assert_eq!(bounded.inner().len().await, 3);
}
