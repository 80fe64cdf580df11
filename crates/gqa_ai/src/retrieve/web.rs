use gqa_core::domain::{EvidenceBundle, EvidenceOrigin, EvidencePassage};
use gqa_core::error::QaError;
use serde::{Deserialize, Serialize};

use super::EvidenceSource;

/// Bounded top-K web search against a Tavily-style JSON API.
pub struct WebSearchSource {
    endpoint: String,
    api_key: Option<String>,
    top_k: u32,
}

impl WebSearchSource {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, top_k: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            top_k: top_k.clamp(1, 50),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: Option<String>,
    content: String,
    score: Option<f32>,
}

impl EvidenceSource for WebSearchSource {
    fn retrieve(&self, question: &str) -> Result<EvidenceBundle, QaError> {
        let q = question.trim();
        if q.is_empty() {
            return Err(QaError::new("RETRIEVAL_FAILED", "Query must not be empty"));
        }
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            QaError::new("RETRIEVAL_FAILED", "Web search API key is not configured")
        })?;

        let req = SearchRequest {
            api_key,
            query: q,
            max_results: self.top_k,
        };
        let resp = ureq::post(&self.endpoint)
            .timeout(std::time::Duration::from_secs(10))
            .send_json(serde_json::to_value(req).map_err(|e| {
                QaError::new("RETRIEVAL_FAILED", "Failed to encode web search request")
                    .with_details(e.to_string())
            })?);

        let parsed: SearchResponse = match resp {
            Ok(r) if r.status() == 200 => r.into_json().map_err(|e| {
                QaError::new("RETRIEVAL_FAILED", "Failed to decode web search response")
                    .with_details(e.to_string())
            })?,
            Ok(r) => {
                return Err(
                    QaError::new("RETRIEVAL_FAILED", "Web search request failed")
                        .with_details(format!("status={}", r.status())),
                );
            }
            Err(e) => {
                return Err(QaError::new(
                    "RETRIEVAL_BACKEND_UNREACHABLE",
                    "Failed to reach web search backend",
                )
                .with_details(e.to_string())
                .with_retryable(true));
            }
        };

        if parsed.results.is_empty() {
            return Err(QaError::new(
                "RETRIEVAL_EMPTY",
                "Web search returned no results",
            ));
        }

        let passages: Vec<EvidencePassage> = parsed
            .results
            .into_iter()
            .enumerate()
            .map(|(i, r)| EvidencePassage {
                id: format!("web-{}", i + 1),
                origin: EvidenceOrigin::Web,
                title: r.title,
                url: r.url,
                text: r.content,
                score: r.score,
            })
            .collect();

        Ok(EvidenceBundle::from_passages(passages, self.top_k as usize))
    }
}
