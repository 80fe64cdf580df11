use serde::{Deserialize, Serialize};

use crate::error::QaError;

/// Explicit pipeline configuration, passed at construction time.
///
/// Every field has a default so partial JSON config files work; unknown
/// fields are rejected to catch typos early.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Completion model used for synthesis and grounding grading.
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Result cap for the web search backend (and the vector index top-k).
    pub top_k_web_results: u32,
    /// Source document the corpus passages are ingested from.
    pub corpus_path: Option<String>,
    pub embedding_model_id: String,
    /// When false, a failed grounding check goes straight to the sentinel.
    pub fallback_enabled: bool,
    /// Marker terms that route a question to the corpus index.
    pub domain_markers: Vec<String>,
    /// Minimum question-term overlap for evidence to be graded relevant.
    pub relevance_threshold: f32,
    pub ollama_base_url: String,
    pub search_endpoint: String,
    pub search_api_key: Option<String>,
    /// Root directory for the corpus passage store and embedding index.
    pub data_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: "llama3:8b".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            top_k_web_results: 5,
            corpus_path: None,
            embedding_model_id: "nomic-embed-text".to_string(),
            fallback_enabled: true,
            domain_markers: vec!["lei".to_string()],
            relevance_threshold: 0.2,
            ollama_base_url: "http://127.0.0.1:11434".to_string(),
            search_endpoint: "https://api.tavily.com/search".to_string(),
            search_api_key: None,
            data_dir: "./data".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, QaError> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| {
            QaError::new("CONFIG_PARSE_FAILED", "Failed to parse pipeline config")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), QaError> {
        if self.model_id.trim().is_empty() {
            return Err(QaError::new("CONFIG_INVALID", "model_id is required"));
        }
        if self.embedding_model_id.trim().is_empty() {
            return Err(QaError::new("CONFIG_INVALID", "embedding_model_id is required"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(QaError::new("CONFIG_INVALID", "temperature out of range")
                .with_details(format!("temperature={}", self.temperature)));
        }
        if self.max_tokens == 0 {
            return Err(QaError::new("CONFIG_INVALID", "max_tokens must be positive"));
        }
        if !(1..=50).contains(&self.top_k_web_results) {
            return Err(QaError::new("CONFIG_INVALID", "top_k_web_results out of range")
                .with_details(format!("top_k_web_results={}", self.top_k_web_results)));
        }
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(QaError::new("CONFIG_INVALID", "relevance_threshold out of range")
                .with_details(format!("relevance_threshold={}", self.relevance_threshold)));
        }
        if self.data_dir.trim().is_empty() {
            return Err(QaError::new("CONFIG_INVALID", "data_dir is required"));
        }
        Ok(())
    }
}
