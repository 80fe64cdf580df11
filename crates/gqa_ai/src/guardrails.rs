use std::collections::BTreeSet;

use gqa_core::domain::EvidenceBundle;

/// Citation marker format: `[[passage:<id>]]` anywhere in model output.
const MARKER_PREFIX: &str = "[[passage:";

/// Parse `[[passage:<id>]]` markers out of model output.
pub fn extract_cited_passage_ids(text: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut rest = text;
    while let Some(start) = rest.find(MARKER_PREFIX) {
        let after_prefix = &rest[start + MARKER_PREFIX.len()..];
        match after_prefix.find("]]") {
            Some(end) => {
                let id = after_prefix[..end].trim();
                if !id.is_empty() {
                    out.insert(id.to_string());
                }
                rest = &after_prefix[end + 2..];
            }
            None => break,
        }
    }
    out
}

/// Remove citation markers from user-facing text, tidying the whitespace
/// the markers leave behind.
pub fn strip_citation_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(MARKER_PREFIX) {
        match rest[start..].find("]]") {
            Some(end_rel) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + end_rel + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);

    let mut collapsed = String::with_capacity(out.len());
    let mut last_space = false;
    for c in out.chars() {
        if c == ' ' {
            if !last_space {
                collapsed.push(c);
            }
            last_space = true;
        } else {
            collapsed.push(c);
            last_space = false;
        }
    }
    collapsed
        .replace(" .", ".")
        .replace(" ,", ",")
        .trim()
        .to_string()
}

/// Check every cited passage id against the bundle. Returns the ids that do
/// not exist there; a non-empty result means the draft fabricated citations.
pub fn unknown_cited_ids(text: &str, bundle: &EvidenceBundle) -> Vec<String> {
    extract_cited_passage_ids(text)
        .into_iter()
        .filter(|id| !bundle.contains_id(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqa_core::domain::{EvidenceOrigin, EvidencePassage};

    fn bundle_with_ids(ids: &[&str]) -> EvidenceBundle {
        EvidenceBundle {
            passages: ids
                .iter()
                .map(|id| EvidencePassage {
                    id: id.to_string(),
                    origin: EvidenceOrigin::Corpus,
                    title: None,
                    url: None,
                    text: "text".to_string(),
                    score: None,
                })
                .collect(),
        }
    }

    #[test]
    fn extracts_and_dedupes_markers() {
        let ids = extract_cited_passage_ids(
            "A fine applies [[passage:abc]]. It is doubled [[passage:def]] [[passage:abc]].",
        );
        assert_eq!(
            ids.into_iter().collect::<Vec<_>>(),
            vec!["abc".to_string(), "def".to_string()]
        );
    }

    #[test]
    fn unterminated_marker_is_ignored() {
        assert!(extract_cited_passage_ids("broken [[passage:abc").is_empty());
    }

    #[test]
    fn stripping_markers_keeps_prose_clean() {
        let text = "A fine applies [[passage:abc]]. See also [[passage:def]] the annex.";
        assert_eq!(
            strip_citation_markers(text),
            "A fine applies. See also the annex."
        );
    }

    #[test]
    fn unknown_ids_are_reported() {
        let bundle = bundle_with_ids(&["abc"]);
        let unknown = unknown_cited_ids("claim [[passage:abc]] and [[passage:zzz]]", &bundle);
        assert_eq!(unknown, vec!["zzz".to_string()]);
    }

    #[test]
    fn known_ids_pass() {
        let bundle = bundle_with_ids(&["abc", "def"]);
        assert!(unknown_cited_ids("x [[passage:abc]]", &bundle).is_empty());
    }
}
