use gqa_core::domain::{EvidenceBundle, GroundingVerdict};
use gqa_core::error::QaError;
use tracing::debug;

use crate::guardrails;
use crate::llm::Llm;
use crate::synthesize::build_evidence_blocks;

mod prompts;

/// Anti-hallucination gate: is every factual claim in the draft entailed by
/// the bundle? Its NotGrounded verdict is the only fallback trigger.
pub trait GroundingGrader: Send + Sync {
    fn grade(
        &self,
        question: &str,
        draft_answer: &str,
        bundle: &EvidenceBundle,
    ) -> Result<GroundingVerdict, QaError>;
}

/// Two-layer grounding check: a deterministic citation guard first, then a
/// binary yes/no entailment call to the completion model.
pub struct LlmGroundingGrader {
    llm: Box<dyn Llm>,
    model: String,
}

impl LlmGroundingGrader {
    pub fn new(llm: Box<dyn Llm>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

impl GroundingGrader for LlmGroundingGrader {
    fn grade(
        &self,
        question: &str,
        draft_answer: &str,
        bundle: &EvidenceBundle,
    ) -> Result<GroundingVerdict, QaError> {
        if draft_answer.trim().is_empty() {
            return Ok(GroundingVerdict::NotGrounded);
        }

        // Fabricated citations never pass, and nothing is entailed by an
        // empty bundle; neither case is worth a model call.
        let unknown = guardrails::unknown_cited_ids(draft_answer, bundle);
        if !unknown.is_empty() {
            debug!(?unknown, "draft cites passages absent from the bundle");
            return Ok(GroundingVerdict::NotGrounded);
        }
        if bundle.is_empty() {
            return Ok(GroundingVerdict::NotGrounded);
        }

        let prompt = prompts::grounding_prompt(question, draft_answer, &build_evidence_blocks(bundle));
        let reply = self.llm.generate(&self.model, &prompt).map_err(|e| {
            QaError::new("GRADING_FAILED", "Failed to run grounding check")
                .with_details(e.to_string())
                .with_retryable(e.retryable)
        })?;

        parse_verdict(&reply).ok_or_else(|| {
            QaError::new(
                "GRADING_VERDICT_UNPARSEABLE",
                "Grounding check did not return yes or no",
            )
            .with_details(format!("reply={}", reply.trim()))
        })
    }
}

/// Accept the first word of the reply, tolerating punctuation and case.
fn parse_verdict(reply: &str) -> Option<GroundingVerdict> {
    let first = reply
        .split(|c: char| !c.is_alphabetic())
        .find(|w| !w.is_empty())?
        .to_lowercase();
    match first.as_str() {
        "yes" => Some(GroundingVerdict::Grounded),
        "no" => Some(GroundingVerdict::NotGrounded),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_parsing_tolerates_noise() {
        assert_eq!(parse_verdict("yes"), Some(GroundingVerdict::Grounded));
        assert_eq!(parse_verdict(" Yes."), Some(GroundingVerdict::Grounded));
        assert_eq!(parse_verdict("NO!"), Some(GroundingVerdict::NotGrounded));
        assert_eq!(parse_verdict("\nno\n"), Some(GroundingVerdict::NotGrounded));
        assert_eq!(parse_verdict("maybe"), None);
        assert_eq!(parse_verdict(""), None);
    }
}
