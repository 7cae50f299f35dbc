use dbr_core::error::AppError;
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::index::{SearchResult, SharedIndex};
use crate::llm::Completer;
use crate::retrieve::{build_context, retrieve};

/// One prior conversation turn, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Request shape consumed from the external chat surface. `context` is an
/// opaque page-context object passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub filename: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Readiness summary for the chat surface's status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStatus {
    pub ready: bool,
    pub chunk_count: usize,
    pub document_count: usize,
}

#[derive(Debug, Clone)]
pub struct AnswerConfig {
    pub embed_model: String,
    pub completion_model: String,
    pub top_k: usize,
    pub max_context_chars: usize,
    pub max_sources: usize,
    pub history_turns: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            embed_model: "nomic-embed-text".to_string(),
            completion_model: "llama3.1".to_string(),
            top_k: 5,
            max_context_chars: 6_000,
            max_sources: 3,
            history_turns: 5,
        }
    }
}

/// Answer a question grounded in the retrieved corpus.
///
/// When the index or the embedding gateway is unavailable this returns the
/// distinct `AI_SERVICE_UNAVAILABLE` condition; it never degrades into a
/// fabricated answer.
pub fn answer(
    index: &SharedIndex,
    embedder: &dyn Embedder,
    completer: &dyn Completer,
    config: &AnswerConfig,
    req: &ChatRequest,
) -> Result<ChatResponse, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::new("AI_REQUEST_INVALID", "Message must not be empty"));
    }

    let results = retrieve(index, embedder, &config.embed_model, message, config.top_k)
        .map_err(|e| match e.code.as_str() {
            "AI_RETRIEVAL_UNAVAILABLE" => AppError::new(
                "AI_SERVICE_UNAVAILABLE",
                "Retrieval service is not available",
            )
            .with_details(e.to_string())
            .with_retryable(e.retryable),
            _ => e,
        })?;

    let prompt = grounding_prompt(&results, &req.history, message, config);

    let text = completer
        .complete(&config.completion_model, &prompt)
        .map_err(|e| {
            AppError::new("AI_SERVICE_UNAVAILABLE", "Answer generation is not available")
                .with_details(e.to_string())
                .with_retryable(e.retryable)
        })?;

    let sources = results
        .iter()
        .take(config.max_sources)
        .map(|r| SourceRef {
            filename: r.chunk.source_filename.clone(),
            score: r.score,
        })
        .collect();

    Ok(ChatResponse {
        answer: text,
        sources,
    })
}

pub fn service_status(index: &SharedIndex) -> ServiceStatus {
    let snapshot = index.snapshot();
    ServiceStatus {
        ready: !snapshot.is_empty(),
        chunk_count: snapshot.len(),
        document_count: snapshot.document_count(),
    }
}

fn grounding_prompt(
    results: &[SearchResult],
    history: &[ChatTurn],
    message: &str,
    config: &AnswerConfig,
) -> String {
    let context = if results.is_empty() {
        "No relevant documents found.".to_string()
    } else {
        build_context(results, config.max_context_chars)
    };

    let mut prompt = format!(
        "You are a helpful assistant that answers questions about Department of \
         Defense appropriations and reprogramming documents.\n\n\
         Use the following context from the documents to answer the user's \
         question. If the context doesn't contain relevant information, say so.\n\n\
         CONTEXT:\n{context}\n\n\
         Instructions:\n\
         - Answer based on the provided context\n\
         - Cite specific documents when possible\n\
         - If the context doesn't have the answer, say \"I don't have enough \
         information in the documents to answer that.\"\n\
         - Be concise but thorough\n\
         - Use specific numbers and details from the documents\n"
    );

    let start = history.len().saturating_sub(config.history_turns);
    for turn in &history[start..] {
        prompt.push_str(&format!("\n{}: {}", turn.role, turn.content));
    }
    prompt.push_str(&format!("\n\nuser: {message}\n"));
    prompt
}
