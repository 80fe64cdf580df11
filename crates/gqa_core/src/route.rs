use crate::domain::RouteDecision;

/// Keyword router: a question mentioning any configured domain marker is
/// answered from the corpus index; everything else goes to web search.
///
/// Fail-open: an empty marker list, or no marker hit, never blocks the
/// pipeline. Consults no evidence source.
pub fn route(question: &str, markers: &[String]) -> RouteDecision {
    let q = question.to_lowercase();
    for marker in markers {
        let m = marker.trim().to_lowercase();
        if !m.is_empty() && q.contains(&m) {
            return RouteDecision::Vectorstore;
        }
    }
    RouteDecision::WebSearch
}
