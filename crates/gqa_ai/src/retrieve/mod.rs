use gqa_core::domain::{EvidenceBundle, EvidenceOrigin, EvidencePassage};
use gqa_core::error::QaError;

use crate::corpus::{CorpusStore, IndexStore};
use crate::embeddings::Embedder;

mod similarity;
pub mod web;

pub use web::WebSearchSource;

/// A retrieval backend the orchestrator can select by route decision.
///
/// `retrieve` fails with a `RETRIEVAL_*` (or `INDEX_*`) error when the
/// backend is unreachable or returns zero results; the orchestrator recovers
/// those by substituting an empty bundle.
pub trait EvidenceSource: Send + Sync {
    fn retrieve(&self, question: &str) -> Result<EvidenceBundle, QaError>;
}

/// Similarity search over the pre-built corpus embedding index.
pub struct VectorIndexSource {
    corpus: CorpusStore,
    index: IndexStore,
    embedder: Box<dyn Embedder>,
    model: String,
    top_k: u32,
}

impl VectorIndexSource {
    pub fn new(
        corpus: CorpusStore,
        index: IndexStore,
        embedder: Box<dyn Embedder>,
        model: impl Into<String>,
        top_k: u32,
    ) -> Self {
        Self {
            corpus,
            index,
            embedder,
            model: model.into(),
            top_k: top_k.clamp(1, 50),
        }
    }
}

impl EvidenceSource for VectorIndexSource {
    fn retrieve(&self, question: &str) -> Result<EvidenceBundle, QaError> {
        let q = question.trim();
        if q.is_empty() {
            return Err(QaError::new("RETRIEVAL_FAILED", "Query must not be empty"));
        }

        let status = self.index.status()?;
        if !status.ready {
            return Err(QaError::new(
                "INDEX_NOT_READY",
                "Index not ready; build the index before querying",
            ));
        }
        let dims = status
            .dims
            .ok_or_else(|| QaError::new("INDEX_NOT_READY", "Index status missing dims"))?;

        let qv = self.embedder.embed(&self.model, q).map_err(|e| {
            QaError::new("RETRIEVAL_FAILED", "Failed to embed query")
                .with_details(e.to_string())
                .with_retryable(e.retryable)
        })?;
        if qv.len() as u32 != dims {
            return Err(QaError::new(
                "RETRIEVAL_FAILED",
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={dims}; query_dims={}", qv.len())));
        }

        let vectors = self.index.read_vectors()?;
        if vectors.is_empty() {
            return Err(QaError::new(
                "INDEX_NOT_READY",
                "Index vectors missing; rebuild index",
            ));
        }

        let q_norm = similarity::l2_norm(&qv);
        if q_norm == 0.0 {
            return Err(QaError::new(
                "RETRIEVAL_FAILED",
                "Query embedding norm is zero",
            ));
        }

        let mut scored: Vec<(String, f32)> = Vec::new();
        for (passage_id, v) in vectors.iter() {
            if v.len() as u32 != dims {
                return Err(QaError::new("RETRIEVAL_FAILED", "Index vector dims mismatch")
                    .with_details(format!(
                        "passage_id={passage_id}; expected={dims}; got={}",
                        v.len()
                    )));
            }
            let v_norm = similarity::l2_norm(v);
            if v_norm == 0.0 {
                continue;
            }
            scored.push((
                passage_id.clone(),
                similarity::cosine_similarity(&qv, v, q_norm, v_norm),
            ));
        }

        // Score desc, passage id asc as a deterministic tie-breaker.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(self.top_k as usize);

        if scored.is_empty() {
            return Err(QaError::new(
                "RETRIEVAL_EMPTY",
                "Vector search returned no results",
            ));
        }

        let mut passages = Vec::new();
        for (passage_id, score) in scored {
            // A store failure here is still a retrieval failure to the
            // orchestrator, not a hard abort.
            let stored = self.corpus.get_passage(&passage_id).map_err(|e| {
                QaError::new("RETRIEVAL_FAILED", "Failed to load passage for hit")
                    .with_details(format!("passage_id={passage_id}; err={e}"))
            })?;
            passages.push(EvidencePassage {
                id: stored.passage_id,
                origin: EvidenceOrigin::Corpus,
                title: None,
                url: None,
                text: stored.text,
                score: Some(score),
            });
        }

        Ok(EvidenceBundle::from_passages(passages, self.top_k as usize))
    }
}
