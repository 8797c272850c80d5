//! Content provider contract.

use topic_types::TopicExtractionInput;

/// Source of raw document text feeding topic extraction.
///
/// Content is single-pass unless [`ContentProvider::is_restartable`] says
/// otherwise.
pub trait ContentProvider: Send + Sync {
    /// Produce documents incrementally.
    fn get_content(&self) -> Box<dyn Iterator<Item = String> + Send + '_>;

    /// Whether `get_content` may be called again to replay the documents.
    fn is_restartable(&self) -> bool {
        false
    }

    /// Wrap the content as an extraction input.
    fn extraction_input(&self) -> TopicExtractionInput<'_> {
        TopicExtractionInput::new(self.get_content())
    }
}

/// Provider over an in-memory list of documents. Restartable.
#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    documents: Vec<String>,
}

impl StaticContentProvider {
    pub fn new<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            documents: documents.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ContentProvider for StaticContentProvider {
    fn get_content(&self) -> Box<dyn Iterator<Item = String> + Send + '_> {
        Box::new(self.documents.iter().cloned())
    }

    fn is_restartable(&self) -> bool {
        true
    }
}
