use std::sync::{Arc, RwLock};

use dbr_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::chunk::DocumentChunk;
use crate::embeddings::Embedder;
use crate::retrieve::similarity::{cosine_similarity, l2_norm};

/// One stored chunk vector with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorIndexEntry {
    pub chunk: DocumentChunk,
    pub vector: Vec<f32>,
}

/// Per-query ranked hit. Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Flat cosine-similarity index. All vectors share one dimension; a mismatch
/// is a hard error, never a silent drop.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dims: usize,
    entries: Vec<VectorIndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VectorIndexEntry] {
        &self.entries
    }

    /// Number of distinct source documents represented in the index.
    pub fn document_count(&self) -> usize {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.chunk.source_document_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Append entries, enforcing a uniform vector dimension. The first entry
    /// ever added fixes the index dimension.
    pub fn add(&mut self, entries: Vec<VectorIndexEntry>) -> Result<(), AppError> {
        for entry in entries {
            let dims = entry.vector.len();
            if self.entries.is_empty() {
                self.dims = dims;
            } else if dims != self.dims {
                return Err(AppError::new(
                    "AI_INDEX_DIM_MISMATCH",
                    "Embedding dimension mismatch across index entries",
                )
                .with_details(format!(
                    "expected={}; got={}; chunk_id={}",
                    self.dims, dims, entry.chunk.id
                )));
            }
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Rank every stored vector against `vector` by cosine similarity.
    ///
    /// Results are sorted non-increasing by score; ties keep insertion order
    /// (stable sort). `k` is clamped to the index size. A zero-norm vector on
    /// either side scores 0.0: "no comparable signal", not an error.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchResult>, AppError> {
        if !self.entries.is_empty() && vector.len() != self.dims {
            return Err(AppError::new(
                "AI_INDEX_DIM_MISMATCH",
                "Query vector dimension does not match index dimension",
            )
            .with_details(format!("index={}; query={}", self.dims, vector.len())));
        }

        let query_norm = l2_norm(vector);
        let mut hits: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(vector, &entry.vector, query_norm, l2_norm(&entry.vector)),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k.min(self.entries.len()));
        Ok(hits)
    }
}

/// Atomically swappable index handle.
///
/// Readers take an `Arc` snapshot and keep querying it even while a rebuild
/// is in progress; the swap is a single pointer update, so no reader ever
/// observes a partially built index.
#[derive(Debug, Default)]
pub struct SharedIndex {
    inner: RwLock<Arc<VectorIndex>>,
}

impl SharedIndex {
    pub fn new(index: VectorIndex) -> Self {
        Self {
            inner: RwLock::new(Arc::new(index)),
        }
    }

    pub fn snapshot(&self) -> Arc<VectorIndex> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_else(|poisoned| Arc::clone(&poisoned.into_inner()))
    }

    /// Replace the active index with a fully built one.
    pub fn swap(&self, next: VectorIndex) {
        let next = Arc::new(next);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Build a complete index off to the side by embedding every chunk.
/// Dimension mismatches abort the build; nothing is ever dropped silently.
pub fn build_index(
    chunks: &[DocumentChunk],
    embedder: &dyn Embedder,
    model: &str,
) -> Result<VectorIndex, AppError> {
    let mut entries = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let vector = embedder.embed(model, &chunk.text).map_err(|e| {
            AppError::new("AI_INDEX_BUILD_FAILED", "Failed to embed chunk during index build")
                .with_details(format!("chunk_id={}; err={}", chunk.id, e))
                .with_retryable(e.retryable)
        })?;
        entries.push(VectorIndexEntry {
            chunk: chunk.clone(),
            vector,
        });
    }

    let mut index = VectorIndex::new();
    index.add(entries)?;
    Ok(index)
}
