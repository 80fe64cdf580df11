use gqa_core::domain::EvidenceBundle;
use gqa_core::error::QaError;

use crate::llm::Llm;

mod prompts;

/// Answer synthesis seam: produce a draft answer constrained to the bundle.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, question: &str, bundle: &EvidenceBundle) -> Result<String, QaError>;
}

/// Completion-backed synthesizer.
pub struct LlmSynthesizer {
    llm: Box<dyn Llm>,
    model: String,
}

impl LlmSynthesizer {
    pub fn new(llm: Box<dyn Llm>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

impl Synthesizer for LlmSynthesizer {
    fn synthesize(&self, question: &str, bundle: &EvidenceBundle) -> Result<String, QaError> {
        let blocks = build_evidence_blocks(bundle);
        let prompt = prompts::answer_prompt(question, &blocks);

        let draft = self.llm.generate(&self.model, &prompt).map_err(|e| {
            QaError::new("SYNTHESIS_FAILED", "Failed to synthesize answer")
                .with_details(e.to_string())
                .with_retryable(e.retryable)
        })?;
        if draft.trim().is_empty() {
            return Err(QaError::new(
                "SYNTHESIS_EMPTY_OUTPUT",
                "Synthesized answer was empty",
            ));
        }
        Ok(draft)
    }
}

/// Render the bundle as evidence blocks the prompts reference by id.
pub fn build_evidence_blocks(bundle: &EvidenceBundle) -> String {
    if bundle.is_empty() {
        return "(no evidence available)".to_string();
    }
    let mut blocks = Vec::new();
    for p in &bundle.passages {
        let mut header = format!("[[passage:{}]]", p.id);
        if let Some(title) = p.title.as_deref() {
            header.push_str(&format!(" title={title}"));
        }
        if let Some(url) = p.url.as_deref() {
            header.push_str(&format!(" url={url}"));
        }
        blocks.push(format!("{header}\n{}", p.text));
    }
    blocks.join("\n\n---\n\n")
}
