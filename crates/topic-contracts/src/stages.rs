//! Stage runners wiring envelopes to contract implementations.
//!
//! Extract: provider -> extractor -> build output.
//! Load: loading input -> sink.
//! Retrieve: run input -> retriever -> run output.

use tracing::{debug, info, instrument};

use topic_types::{
    TopicExtractionBuildOutput, TopicLoadingInput, TopicRetrievalRunInput,
    TopicRetrievalRunOutput,
};

use crate::embedding::EmbeddingFunction;
use crate::error::BackendError;
use crate::extractor::TopicExtractor;
use crate::provider::ContentProvider;
use crate::retriever::TopicRetriever;
use crate::sink::TopicsSink;

/// Counts of records handed to a sink by [`load_topics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records passed to `add_topics`
    pub plain: usize,
    /// Records passed to `add_embedded_topics`
    pub embedded: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.plain + self.embedded
    }
}

/// Extract topics from everything a provider yields.
pub fn extract_from_provider<E, P>(extractor: &E, provider: &P) -> TopicExtractionBuildOutput<E::Output>
where
    E: TopicExtractor + ?Sized,
    P: ContentProvider + ?Sized,
{
    extractor.build(provider.extraction_input())
}

/// Persist a loading input.
///
/// Plain topics go to `add_topics`, embedded ones to `add_embedded_topics`
/// with `embedding_function` forwarded. Plain topics are written first; an
/// error from either call is returned as-is.
#[instrument(skip_all, fields(count = input.len()))]
pub async fn load_topics<S>(
    sink: &S,
    input: TopicLoadingInput,
    embedding_function: Option<&dyn EmbeddingFunction>,
) -> Result<LoadReport, BackendError>
where
    S: TopicsSink + ?Sized,
{
    let (plain, embedded) = input.split();
    let report = LoadReport {
        plain: plain.len(),
        embedded: embedded.len(),
    };

    if !plain.is_empty() {
        sink.add_topics(&plain).await?;
    }
    if !embedded.is_empty() {
        sink.add_embedded_topics(&embedded, embedding_function)
            .await?;
    }

    info!(
        plain = report.plain,
        embedded = report.embedded,
        "Loaded topics"
    );
    Ok(report)
}

/// Run a retrieval against a retriever.
#[instrument(skip(retriever, input), fields(n_results = input.n_results))]
pub async fn run_retrieval<R>(
    retriever: &R,
    query: &str,
    input: &TopicRetrievalRunInput,
) -> Result<TopicRetrievalRunOutput, BackendError>
where
    R: TopicRetriever + ?Sized,
{
    let topics = retriever.get_topics_with(query, input).await?;
    debug!(returned = topics.len(), "Retrieval complete");
    Ok(TopicRetrievalRunOutput::performed(topics))
}

/// Run a retrieval if a retriever is configured.
///
/// Without one the output reports that no retrieval was performed, which
/// stays distinct from a retrieval with zero matches.
pub async fn maybe_run_retrieval<R>(
    retriever: Option<&R>,
    query: &str,
    input: &TopicRetrievalRunInput,
) -> Result<TopicRetrievalRunOutput, BackendError>
where
    R: TopicRetriever + ?Sized,
{
    match retriever {
        Some(retriever) => run_retrieval(retriever, query, input).await,
        None => {
            debug!("No retriever configured, skipping retrieval");
            Ok(TopicRetrievalRunOutput::not_performed())
        }
    }
}
