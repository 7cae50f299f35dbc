use dbr_ai::answer::{answer, service_status, AnswerConfig, ChatRequest, ChatTurn};
use dbr_ai::chunk::DocumentChunk;
use dbr_ai::embeddings::Embedder;
use dbr_ai::index::{SharedIndex, VectorIndex, VectorIndexEntry};
use dbr_ai::llm::Completer;
use dbr_core::error::AppError;
use pretty_assertions::assert_eq;
use std::sync::Mutex;

struct TermCountEmbedder;

impl Embedder for TermCountEmbedder {
    fn embed(&self, _model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let lower = input.to_lowercase();
        Ok(vec![
            lower.matches("army").count() as f32,
            lower.matches("navy").count() as f32,
            1.0,
        ])
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _model: &str, _input: &str) -> Result<Vec<f32>, AppError> {
        Err(AppError::new("AI_EMBEDDINGS_FAILED", "gateway down").with_retryable(true))
    }
}

/// Records the prompt it was handed and returns a canned answer.
struct RecordingCompleter {
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompleter {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl Completer for RecordingCompleter {
    fn complete(&self, _model: &str, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("The Army reprogramming totals $118,600 thousand.".to_string())
    }
}

struct FailingCompleter;

impl Completer for FailingCompleter {
    fn complete(&self, _model: &str, _prompt: &str) -> Result<String, AppError> {
        Err(AppError::new("AI_COMPLETION_FAILED", "runtime down").with_retryable(true))
    }
}

fn chunk(id: &str, filename: &str, text: &str) -> DocumentChunk {
    DocumentChunk {
        id: id.to_string(),
        source_document_id: format!("doc-{id}"),
        source_filename: filename.to_string(),
        text: text.to_string(),
        start_offset: 0,
        end_offset: text.chars().count(),
    }
}

fn indexed() -> SharedIndex {
    let mut index = VectorIndex::new();
    index
        .add(vec![
            VectorIndexEntry {
                chunk: chunk("a", "FY2025_IR_army.pdf", "ARMY INCREASE +21 army army"),
                vector: vec![4.0, 0.0, 1.0],
            },
            VectorIndexEntry {
                chunk: chunk("b", "FY2025_PA_navy.pdf", "NAVY DECREASE navy navy"),
                vector: vec![0.0, 4.0, 1.0],
            },
        ])
        .unwrap();
    SharedIndex::new(index)
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        context: serde_json::Value::Null,
        history: Vec::new(),
    }
}

#[test]
fn answer_cites_the_top_ranked_sources() {
    let shared = indexed();
    let completer = RecordingCompleter::new();
    let config = AnswerConfig::default();

    let resp = answer(&shared, &TermCountEmbedder, &completer, &config, &request("army amounts")).unwrap();

    assert_eq!(resp.answer, "The Army reprogramming totals $118,600 thousand.");
    assert!(!resp.sources.is_empty());
    assert_eq!(resp.sources[0].filename, "FY2025_IR_army.pdf");
    for pair in resp.sources.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let prompt = completer.last_prompt();
    assert!(prompt.contains("[From FY2025_IR_army.pdf]"));
    assert!(prompt.contains("user: army amounts"));
}

#[test]
fn history_is_limited_to_recent_turns() {
    let shared = indexed();
    let completer = RecordingCompleter::new();
    let config = AnswerConfig::default();

    let history: Vec<ChatTurn> = (0..8)
        .map(|i| ChatTurn {
            role: "user".to_string(),
            content: format!("turn-{i}"),
        })
        .collect();
    let req = ChatRequest {
        message: "army amounts".to_string(),
        context: serde_json::Value::Null,
        history,
    };

    answer(&shared, &TermCountEmbedder, &completer, &config, &req).unwrap();

    let prompt = completer.last_prompt();
    assert!(!prompt.contains("turn-2"), "older turns must be dropped");
    assert!(prompt.contains("turn-3"));
    assert!(prompt.contains("turn-7"));
}

#[test]
fn unavailable_retrieval_becomes_service_unavailable() {
    let shared = indexed();
    let config = AnswerConfig::default();

    let err = answer(&shared, &FailingEmbedder, &RecordingCompleter::new(), &config, &request("army")).unwrap_err();
    assert_eq!(err.code, "AI_SERVICE_UNAVAILABLE");
    assert!(err.retryable);

    let empty = SharedIndex::default();
    let err = answer(&empty, &TermCountEmbedder, &RecordingCompleter::new(), &config, &request("army")).unwrap_err();
    assert_eq!(err.code, "AI_SERVICE_UNAVAILABLE");
}

#[test]
fn completer_failure_becomes_service_unavailable() {
    let shared = indexed();
    let config = AnswerConfig::default();

    let err = answer(&shared, &TermCountEmbedder, &FailingCompleter, &config, &request("army")).unwrap_err();
    assert_eq!(err.code, "AI_SERVICE_UNAVAILABLE");
    assert!(err.retryable);
}

#[test]
fn blank_message_is_rejected() {
    let shared = indexed();
    let config = AnswerConfig::default();

    let err = answer(&shared, &TermCountEmbedder, &RecordingCompleter::new(), &config, &request("  \n ")).unwrap_err();
    assert_eq!(err.code, "AI_REQUEST_INVALID");
}

#[test]
fn request_defaults_tolerate_a_bare_message() {
    let req: ChatRequest = serde_json::from_str(r#"{"message":"what changed for the Army?"}"#).unwrap();
    assert_eq!(req.message, "what changed for the Army?");
    assert!(req.history.is_empty());
    assert!(req.context.is_null());
}

#[test]
fn status_reflects_the_active_snapshot() {
    let empty = SharedIndex::default();
    let status = service_status(&empty);
    assert!(!status.ready);
    assert_eq!(status.chunk_count, 0);

    let shared = indexed();
    let status = service_status(&shared);
    assert!(status.ready);
    assert_eq!(status.chunk_count, 2);
    assert_eq!(status.document_count, 2);
}
