use std::collections::BTreeSet;

use crate::domain::{EvidenceBundle, RelevanceVerdict};

/// Common function words excluded from overlap scoring.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "about", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "in", "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "under", "was",
    "what", "when", "where", "which", "who", "why", "will", "with", "would", "you", "your",
];

/// Content terms of a question: lowercase alphanumeric tokens, at least two
/// characters, stopword-filtered, deduplicated.
pub fn question_terms(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.len() < 2 || STOPWORDS.contains(&token) {
            continue;
        }
        if seen.insert(token.to_string()) {
            out.push(token.to_string());
        }
    }
    out
}

fn bundle_terms(bundle: &EvidenceBundle) -> BTreeSet<String> {
    let mut terms = BTreeSet::new();
    for passage in &bundle.passages {
        let lowered = passage.text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()) {
            if token.len() >= 2 {
                terms.insert(token.to_string());
            }
        }
    }
    terms
}

/// Lexical relevance gate: the share of question content terms that appear
/// anywhere in the bundle must reach `threshold`.
///
/// An empty bundle, or a question with no usable content terms, is never
/// relevant. Pure function, no failure modes.
pub fn grade_relevance(
    question: &str,
    bundle: &EvidenceBundle,
    threshold: f32,
) -> RelevanceVerdict {
    if bundle.is_empty() {
        return RelevanceVerdict::NotRelevant;
    }
    let q_terms = question_terms(question);
    if q_terms.is_empty() {
        return RelevanceVerdict::NotRelevant;
    }
    let b_terms = bundle_terms(bundle);
    let hits = q_terms.iter().filter(|t| b_terms.contains(*t)).count();
    let ratio = hits as f32 / q_terms.len() as f32;
    if ratio >= threshold {
        RelevanceVerdict::Relevant
    } else {
        RelevanceVerdict::NotRelevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvidenceOrigin, EvidencePassage};

    fn bundle_of(texts: &[&str]) -> EvidenceBundle {
        EvidenceBundle {
            passages: texts
                .iter()
                .enumerate()
                .map(|(i, t)| EvidencePassage {
                    id: format!("p{i}"),
                    origin: EvidenceOrigin::Corpus,
                    title: None,
                    url: None,
                    text: t.to_string(),
                    score: None,
                })
                .collect(),
        }
    }

    #[test]
    fn question_terms_drop_stopwords_and_dedupe() {
        let terms = question_terms("What is the penalty for the penalty?");
        assert_eq!(terms, vec!["penalty".to_string()]);
    }

    #[test]
    fn empty_bundle_is_not_relevant() {
        assert_eq!(
            grade_relevance("any question", &EvidenceBundle::empty(), 0.2),
            RelevanceVerdict::NotRelevant
        );
    }

    #[test]
    fn overlapping_evidence_is_relevant() {
        let bundle = bundle_of(&["The penalty for violating this law is a fine."]);
        assert_eq!(
            grade_relevance("What is the penalty under this law?", &bundle, 0.2),
            RelevanceVerdict::Relevant
        );
    }

    #[test]
    fn off_topic_evidence_is_not_relevant() {
        let bundle = bundle_of(&["Today it is sunny with a light breeze."]);
        assert_eq!(
            grade_relevance("What is the penalty under this law?", &bundle, 0.2),
            RelevanceVerdict::NotRelevant
        );
    }

    #[test]
    fn threshold_zero_accepts_any_nonempty_bundle() {
        let bundle = bundle_of(&["completely unrelated text"]);
        assert_eq!(
            grade_relevance("penalty law", &bundle, 0.0),
            RelevanceVerdict::Relevant
        );
    }

    #[test]
    fn stopword_only_question_is_not_relevant() {
        let bundle = bundle_of(&["some text"]);
        assert_eq!(
            grade_relevance("what is the", &bundle, 0.2),
            RelevanceVerdict::NotRelevant
        );
    }
}
