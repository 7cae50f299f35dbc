use dbr_core::error::AppError;

/// Opaque embedding capability. The core depends only on this contract; the
/// provider behind it is interchangeable.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod http;
