use dbr_core::error::AppError;

/// Opaque answer-generation capability.
pub trait Completer {
    fn complete(&self, model: &str, prompt: &str) -> Result<String, AppError>;
}

pub mod http;
