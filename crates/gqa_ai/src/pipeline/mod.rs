use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gqa_core::config::PipelineConfig;
use gqa_core::domain::{
    Answer, EvidenceBundle, GroundingVerdict, Outcome, RelevanceVerdict, RouteDecision,
};
use gqa_core::error::QaError;
use gqa_core::relevance::grade_relevance;
use gqa_core::route::route;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::grade::GroundingGrader;
use crate::guardrails;
use crate::retrieve::EvidenceSource;
use crate::synthesize::Synthesizer;

/// Pipeline stage, recorded in the run trace.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Routing,
    Retrieving,
    GradingRelevance,
    Synthesizing,
    GradingGrounding,
    FallbackRetrieving,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Routing => "routing",
            Stage::Retrieving => "retrieving",
            Stage::GradingRelevance => "grading_relevance",
            Stage::Synthesizing => "synthesizing",
            Stage::GradingGrounding => "grading_grounding",
            Stage::FallbackRetrieving => "fallback_retrieving",
            Stage::Done => "done",
        }
    }
}

/// Cooperative cancellation checked at every stage boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-run observability summary returned next to the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub question: String,
    /// Route chosen by the keyword router (before any fallback re-route).
    pub route: RouteDecision,
    pub fallback_used: bool,
    /// True when the attempt that produced the terminal outcome had
    /// evidence graded NotRelevant (recorded, never gating).
    pub low_confidence: bool,
    /// Relevance verdicts, one per attempt.
    pub relevance: Vec<RelevanceVerdict>,
    /// Grounding verdicts, one per attempt.
    pub grounding: Vec<GroundingVerdict>,
    pub retrievals: u32,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub outcome: Outcome,
    pub report: RunReport,
}

/// Sequences routing, retrieval, relevance grading, synthesis and grounding
/// grading over the trait seams, applying the fallback policy at the
/// grounding gate.
///
/// Safe to share across threads; every run owns its own state.
pub struct Pipeline {
    config: PipelineConfig,
    vector_source: Box<dyn EvidenceSource>,
    web_source: Box<dyn EvidenceSource>,
    synthesizer: Box<dyn Synthesizer>,
    grounding: Box<dyn GroundingGrader>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        vector_source: Box<dyn EvidenceSource>,
        web_source: Box<dyn EvidenceSource>,
        synthesizer: Box<dyn Synthesizer>,
        grounding: Box<dyn GroundingGrader>,
    ) -> Result<Self, QaError> {
        config.validate()?;
        Ok(Self {
            config,
            vector_source,
            web_source,
            synthesizer,
            grounding,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer a single question. See `answer_with_cancel`.
    pub fn answer(&self, question: &str) -> Result<PipelineRun, QaError> {
        self.answer_with_cancel(question, &CancelToken::new())
    }

    /// Run the full pipeline for one question.
    ///
    /// Returns `Ok` with either a grounded answer or the sentinel outcome;
    /// returns `Err` only for hard pipeline failures (synthesis/grading
    /// errors, cancellation, empty question).
    pub fn answer_with_cancel(
        &self,
        question: &str,
        cancel: &CancelToken,
    ) -> Result<PipelineRun, QaError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::new(
                "PIPELINE_QUESTION_EMPTY",
                "Question must not be empty",
            ));
        }

        let mut report = RunReport {
            question: question.to_string(),
            route: RouteDecision::WebSearch,
            fallback_used: false,
            low_confidence: false,
            relevance: Vec::new(),
            grounding: Vec::new(),
            retrievals: 0,
            stages: Vec::new(),
        };

        self.checkpoint(cancel, Stage::Routing, &mut report)?;
        let mut decision = route(question, &self.config.domain_markers);
        report.route = decision;
        info!(route = decision.as_str(), "routed question");

        // One full attempt per iteration; the grounding gate re-enters the
        // loop at most once, forced onto the web route.
        loop {
            let retrieve_stage = if report.fallback_used {
                Stage::FallbackRetrieving
            } else {
                Stage::Retrieving
            };
            self.checkpoint(cancel, retrieve_stage, &mut report)?;
            let bundle = match self.source_for(decision).retrieve(question) {
                Ok(bundle) => bundle,
                Err(e) if e.is_retrieval() => {
                    // Degrade gracefully: the graders reject an empty bundle
                    // downstream instead of the run aborting here.
                    warn!(code = %e.code, "retrieval failed; continuing with empty bundle");
                    EvidenceBundle::empty()
                }
                Err(e) => return Err(e),
            };
            report.retrievals += 1;
            debug!(passages = bundle.len(), "retrieved evidence");

            self.checkpoint(cancel, Stage::GradingRelevance, &mut report)?;
            let relevance =
                grade_relevance(question, &bundle, self.config.relevance_threshold);
            report.relevance.push(relevance);
            report.low_confidence = relevance == RelevanceVerdict::NotRelevant;
            if report.low_confidence {
                // Recorded but not gating; synthesis proceeds regardless.
                warn!("evidence graded not relevant; proceeding low-confidence");
            }

            self.checkpoint(cancel, Stage::Synthesizing, &mut report)?;
            let draft = self.synthesizer.synthesize(question, &bundle)?;

            self.checkpoint(cancel, Stage::GradingGrounding, &mut report)?;
            let grounding = self.grounding.grade(question, &draft, &bundle)?;
            report.grounding.push(grounding);
            info!(verdict = ?grounding, "grounding check complete");

            match grounding {
                GroundingVerdict::Grounded => {
                    report.stages.push(Stage::Done);
                    let cited = guardrails::extract_cited_passage_ids(&draft);
                    let answer = Answer {
                        text: guardrails::strip_citation_markers(&draft),
                        cited_passage_ids: cited.into_iter().collect(),
                    };
                    return Ok(PipelineRun {
                        outcome: Outcome::Answered { answer },
                        report,
                    });
                }
                GroundingVerdict::NotGrounded => {
                    if self.config.fallback_enabled && !report.fallback_used {
                        // Set-once flag: checked above, set here, never cleared.
                        report.fallback_used = true;
                        decision = RouteDecision::WebSearch;
                        info!("answer not grounded; falling back to web search");
                        continue;
                    }
                    report.stages.push(Stage::Done);
                    return Ok(PipelineRun {
                        outcome: Outcome::NoGroundedAnswer,
                        report,
                    });
                }
            }
        }
    }

    fn source_for(&self, decision: RouteDecision) -> &dyn EvidenceSource {
        match decision {
            RouteDecision::Vectorstore => self.vector_source.as_ref(),
            RouteDecision::WebSearch => self.web_source.as_ref(),
        }
    }

    fn checkpoint(
        &self,
        cancel: &CancelToken,
        stage: Stage,
        report: &mut RunReport,
    ) -> Result<(), QaError> {
        if cancel.is_cancelled() {
            return Err(QaError::new("PIPELINE_CANCELLED", "Run was cancelled")
                .with_details(format!("stage={}", stage.as_str())));
        }
        report.stages.push(stage);
        Ok(())
    }
}
