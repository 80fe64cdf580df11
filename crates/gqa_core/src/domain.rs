use serde::{Deserialize, Serialize};

/// Fixed answer returned when every retrieval/grounding attempt is exhausted.
pub const SENTINEL_ANSWER: &str = "Sorry, I could not find a valid answer.";

/// Evidence route selected for a question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    Vectorstore,
    WebSearch,
}

impl RouteDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Vectorstore => "vectorstore",
            RouteDecision::WebSearch => "web_search",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vectorstore" => Some(Self::Vectorstore),
            "web_search" => Some(Self::WebSearch),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceOrigin {
    Corpus,
    Web,
}

/// One retrieved passage, normalized across evidence sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidencePassage {
    pub id: String,
    pub origin: EvidenceOrigin,
    pub title: Option<String>,
    pub url: Option<String>,
    pub text: String,
    pub score: Option<f32>,
}

/// Ordered evidence set used as context for synthesis and grading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvidenceBundle {
    pub passages: Vec<EvidencePassage>,
}

impl EvidenceBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bundle from already-ordered passages, dropping the tail
    /// beyond `max_passages`.
    pub fn from_passages(mut passages: Vec<EvidencePassage>, max_passages: usize) -> Self {
        passages.truncate(max_passages);
        Self { passages }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.passages.iter().any(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceVerdict {
    Relevant,
    NotRelevant,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroundingVerdict {
    Grounded,
    NotGrounded,
}

/// Final answer with the passage ids the model cited inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub cited_passage_ids: Vec<String>,
}

/// Terminal pipeline result. A hard pipeline failure is a `QaError` from the
/// entry point instead, never conflated with the sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Answered { answer: Answer },
    NoGroundedAnswer,
}

impl Outcome {
    /// The string presented to the user.
    pub fn final_text(&self) -> &str {
        match self {
            Outcome::Answered { answer } => answer.text.as_str(),
            Outcome::NoGroundedAnswer => SENTINEL_ANSWER,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(id: &str, text: &str) -> EvidencePassage {
        EvidencePassage {
            id: id.to_string(),
            origin: EvidenceOrigin::Corpus,
            title: None,
            url: None,
            text: text.to_string(),
            score: None,
        }
    }

    #[test]
    fn route_decision_string_roundtrip() {
        for d in [RouteDecision::Vectorstore, RouteDecision::WebSearch] {
            assert_eq!(RouteDecision::parse(d.as_str()), Some(d));
        }
        assert_eq!(RouteDecision::parse("websearch"), None);
    }

    #[test]
    fn bundle_truncates_tail_beyond_cap() {
        let passages = (0..8).map(|i| passage(&format!("p{i}"), "t")).collect();
        let bundle = EvidenceBundle::from_passages(passages, 5);
        assert_eq!(bundle.len(), 5);
        assert!(bundle.contains_id("p0"));
        assert!(!bundle.contains_id("p7"));
    }

    #[test]
    fn sentinel_outcome_renders_fixed_text() {
        assert_eq!(Outcome::NoGroundedAnswer.final_text(), SENTINEL_ANSWER);
        assert!(!Outcome::NoGroundedAnswer.is_answered());
    }
}
