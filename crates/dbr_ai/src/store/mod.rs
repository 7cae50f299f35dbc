use std::fs;
use std::path::{Path, PathBuf};

use dbr_core::error::AppError;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::chunk::DocumentChunk;
use crate::index::{VectorIndex, VectorIndexEntry};

/// Index build metadata persisted next to the chunk/vector artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStatus {
    pub ready: bool,
    pub model: Option<String>,
    pub dims: Option<usize>,
    pub chunk_count: usize,
    pub document_count: usize,
    pub updated_at: Option<String>,
}

impl IndexStatus {
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            model: None,
            dims: None,
            chunk_count: 0,
            document_count: 0,
            updated_at: None,
        }
    }
}

/// On-disk persistence for the retrieval corpus: a chunk record sequence and
/// an index-aligned vector array (chunk `i` corresponds to vector row `i`).
/// Writes are atomic (tmp then rename); loads fail closed on any alignment
/// break rather than truncating or padding.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    root: PathBuf,
}

impl CorpusStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn chunks_path(&self) -> PathBuf {
        self.root.join("chunks.json")
    }

    fn vectors_path(&self) -> PathBuf {
        self.root.join("vectors.json")
    }

    fn status_path(&self) -> PathBuf {
        self.root.join("index_status.json")
    }

    fn ensure_dirs(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root.as_path()).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to create corpus store directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })
    }

    fn write_json(&self, path: &Path, json: String) -> Result<(), AppError> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes()).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to write corpus artifact")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to finalize corpus artifact write")
                .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
        })
    }

    /// Persist the full index contents. Chunk and vector counts must already
    /// agree; a mismatch here is refused rather than written out.
    pub fn save(&self, index: &VectorIndex, model: &str) -> Result<IndexStatus, AppError> {
        self.ensure_dirs()?;

        let chunks: Vec<&DocumentChunk> = index.entries().iter().map(|e| &e.chunk).collect();
        let vectors: Vec<&Vec<f32>> = index.entries().iter().map(|e| &e.vector).collect();

        let chunks_json = serde_json::to_string_pretty(&chunks).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to encode chunk records").with_details(e.to_string())
        })?;
        let vectors_json = serde_json::to_string_pretty(&vectors).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to encode vector rows").with_details(e.to_string())
        })?;

        self.write_json(&self.chunks_path(), chunks_json)?;
        self.write_json(&self.vectors_path(), vectors_json)?;

        let updated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| {
                AppError::new("AI_STORE_FAILED", "Failed to format build timestamp")
                    .with_details(e.to_string())
            })?;
        let status = IndexStatus {
            ready: !index.is_empty(),
            model: Some(model.to_string()),
            dims: (!index.is_empty()).then(|| index.dims()),
            chunk_count: index.len(),
            document_count: index.document_count(),
            updated_at: Some(updated_at),
        };
        let status_json = serde_json::to_string_pretty(&status).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to encode index status").with_details(e.to_string())
        })?;
        self.write_json(&self.status_path(), status_json)?;

        Ok(status)
    }

    pub fn status(&self) -> Result<IndexStatus, AppError> {
        let path = self.status_path();
        if !path.exists() {
            return Ok(IndexStatus::not_ready());
        }
        let bytes = fs::read(&path).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to read index status")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::new("AI_STORE_FAILED", "Failed to decode index status")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    /// Load the persisted corpus back into an index.
    ///
    /// Fails closed with `AI_STORE_MISALIGNED` when the chunk sequence and
    /// vector array disagree in length or the vector rows are ragged.
    pub fn load(&self) -> Result<VectorIndex, AppError> {
        let chunks_path = self.chunks_path();
        let vectors_path = self.vectors_path();
        if !chunks_path.exists() || !vectors_path.exists() {
            return Err(AppError::new(
                "AI_STORE_NOT_FOUND",
                "Corpus artifacts missing; build and save an index first",
            )
            .with_details(format!("root={}", self.root.display())));
        }

        let chunks: Vec<DocumentChunk> = read_json(&chunks_path, "chunk records")?;
        let vectors: Vec<Vec<f32>> = read_json(&vectors_path, "vector rows")?;

        if chunks.len() != vectors.len() {
            return Err(AppError::new(
                "AI_STORE_MISALIGNED",
                "Chunk records and vector rows are not index-aligned",
            )
            .with_details(format!("chunks={}; vectors={}", chunks.len(), vectors.len())));
        }
        if let Some(first) = vectors.first() {
            let dims = first.len();
            if let Some(bad) = vectors.iter().position(|v| v.len() != dims) {
                return Err(AppError::new(
                    "AI_STORE_MISALIGNED",
                    "Vector rows do not share a single dimension",
                )
                .with_details(format!("expected={dims}; got={}; row={bad}", vectors[bad].len())));
            }
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorIndexEntry { chunk, vector })
            .collect();

        let mut index = VectorIndex::new();
        index.add(entries)?;
        Ok(index)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new("AI_STORE_FAILED", format!("Failed to read {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::new("AI_STORE_MISALIGNED", format!("Failed to decode {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}
