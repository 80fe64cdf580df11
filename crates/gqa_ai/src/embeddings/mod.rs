use gqa_core::error::QaError;

/// Embedding seam used by index builds and query-time retrieval.
pub trait Embedder: Send + Sync {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, QaError>;
}

pub mod ollama_embed;
