use gqa_core::error::QaError;

/// Text completion seam. Implementations return neutral `AI_COMPLETION_*`
/// codes; callers wrap them into their own stage's error namespace.
pub trait Llm: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, QaError>;
}

pub mod ollama_llm;
