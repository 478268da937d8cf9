//! Brute-force top-K retrieval over an event corpus

use crate::error::{Error, Result};
use crate::types::{EmbeddingCorpus, RetrievedDocument};

use super::similarity::cosine_similarity;

/// Rank every corpus document against the query embedding and keep the best `top_k`.
///
/// Results are ordered by non-increasing score; equal scores keep corpus order.
/// Position ids are `1..=len` in result order.
pub fn retrieve(
    query_embedding: &[f32],
    corpus: &EmbeddingCorpus,
    top_k: usize,
) -> Result<Vec<RetrievedDocument>> {
    if query_embedding.len() != corpus.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: corpus.dimensions(),
            actual: query_embedding.len(),
        });
    }

    let mut scored: Vec<(usize, f32)> = corpus
        .embeddings()
        .iter()
        .enumerate()
        .map(|(idx, embedding)| (idx, cosine_similarity(query_embedding, embedding)))
        .collect();

    // Stable sort: ties keep the lower corpus index first. NaN ranks last.
    scored.sort_by(|a, b| sort_key(b.1).total_cmp(&sort_key(a.1)));
    scored.truncate(top_k);

    let documents = corpus.documents();
    let results = scored
        .into_iter()
        .enumerate()
        .map(|(i, (idx, score))| RetrievedDocument::from_record(&documents[idx], score, i + 1))
        .collect::<Vec<_>>();

    tracing::debug!(
        "Retrieved {} of {} documents for event {}",
        results.len(),
        corpus.len(),
        corpus.event_id()
    );

    Ok(results)
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
