use dbr_core::domain::RawDocument;
use dbr_core::error::AppError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default retrieval window parameters. 512-character windows with a 128-char
/// overlap trade index size against recall; neither value is a correctness
/// requirement.
pub const DEFAULT_WINDOW_SIZE: usize = 512;
pub const DEFAULT_STRIDE: usize = 384;

/// A bounded span of one document's recognized text, the unit of semantic
/// retrieval. Offsets are character offsets into the source text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentChunk {
    pub id: String,
    pub source_document_id: String,
    pub source_filename: String,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Fixed-size overlapping windows over `text`, in character offsets.
///
/// Recomputing over identical input and parameters yields an identical
/// sequence. Text no longer than the window yields exactly one span covering
/// the whole text.
pub fn chunk_spans(text: &str, window_size: usize, stride: usize) -> Result<Vec<(usize, usize)>, AppError> {
    if window_size == 0 || stride == 0 {
        return Err(AppError::new(
            "AI_CHUNK_CONFIG_INVALID",
            "Chunk window and stride must both be non-zero",
        )
        .with_details(format!("window_size={window_size}; stride={stride}")));
    }

    let len = text.chars().count();
    if len <= window_size {
        return Ok(vec![(0, len)]);
    }

    let mut spans = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + window_size).min(len);
        spans.push((start, end));
        if end == len {
            break;
        }
        start += stride;
        // A stride wider than the window can step past the end of the text.
        if start >= len {
            break;
        }
    }
    Ok(spans)
}

/// Chunk one document into retrieval units with deterministic ids.
pub fn chunk_document(
    doc: &RawDocument,
    window_size: usize,
    stride: usize,
) -> Result<Vec<DocumentChunk>, AppError> {
    let spans = chunk_spans(&doc.recognized_text, window_size, stride)?;

    // Char offset -> byte offset map, one pass.
    let byte_offsets: Vec<usize> = doc
        .recognized_text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(doc.recognized_text.len()))
        .collect();

    let mut out = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        let text = doc.recognized_text[byte_offsets[start]..byte_offsets[end]].to_string();
        let payload = format!("chunk|doc={}|start={start}|end={end}|sha={}",
            doc.id,
            hex::encode(Sha256::digest(text.as_bytes()))
        );
        out.push(DocumentChunk {
            id: hex::encode(Sha256::digest(payload.as_bytes())),
            source_document_id: doc.id.clone(),
            source_filename: doc.source_filename.clone(),
            text,
            start_offset: start,
            end_offset: end,
        });
    }
    Ok(out)
}
