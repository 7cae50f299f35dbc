use dbr_core::error::AppError;

use crate::embeddings::Embedder;
use crate::index::{SearchResult, SharedIndex};

pub mod similarity;

/// Embed `query` and rank the active index snapshot against it.
///
/// An unavailable gateway or an empty index surfaces as the distinct
/// `AI_RETRIEVAL_UNAVAILABLE` condition; this never falls back to stale or
/// fabricated results.
pub fn retrieve(
    index: &SharedIndex,
    embedder: &dyn Embedder,
    model: &str,
    query: &str,
    k: usize,
) -> Result<Vec<SearchResult>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::new("AI_RETRIEVAL_FAILED", "Query must not be empty"));
    }
    let k = k.max(1);

    let snapshot = index.snapshot();
    if snapshot.is_empty() {
        return Err(AppError::new(
            "AI_RETRIEVAL_UNAVAILABLE",
            "Index is empty; build the index before querying",
        ));
    }

    let query_vector = embedder.embed(model, query).map_err(|e| {
        AppError::new("AI_RETRIEVAL_UNAVAILABLE", "Embedding gateway unavailable")
            .with_details(format!("err={e}"))
            .with_retryable(e.retryable)
    })?;

    if query_vector.len() != snapshot.dims() {
        return Err(AppError::new(
            "AI_RETRIEVAL_FAILED",
            "Query embedding dims do not match index dims",
        )
        .with_details(format!("index={}; query={}", snapshot.dims(), query_vector.len())));
    }

    snapshot.query(&query_vector, k)
}

/// Concatenate ranked chunk texts into a grounding context, each block tagged
/// with its source filename, truncated at a char boundary to `max_chars`.
pub fn build_context(results: &[SearchResult], max_chars: usize) -> String {
    let blocks: Vec<String> = results
        .iter()
        .map(|r| format!("[From {}]\n{}", r.chunk.source_filename, r.chunk.text))
        .collect();
    let joined = blocks.join("\n\n---\n\n");

    if joined.chars().count() <= max_chars {
        return joined;
    }
    joined.chars().take(max_chars).collect()
}
