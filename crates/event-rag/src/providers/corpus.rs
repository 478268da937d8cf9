//! Corpus loader trait for fetching an event's precomputed embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::EmbeddingCorpus;

/// Trait for loading the documents and embeddings of one event
///
/// Implementations:
/// - `FileCorpusLoader`: `{data_dir}/{event_id}.json` on the local filesystem
#[async_trait]
pub trait CorpusLoader: Send + Sync {
    /// Load the corpus for an event.
    ///
    /// Fails with `Error::CorpusUnavailable` when the event has no precomputed embeddings.
    async fn load_corpus(&self, event_id: &str) -> Result<EmbeddingCorpus>;

    /// Get loader name for logging
    fn name(&self) -> &str;
}
