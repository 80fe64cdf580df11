use serde::{Deserialize, Serialize};

/// A corpus passage: the unit of retrieval and citation.
///
/// Passage ids are deterministic (sha256 over source label, ordinal and text
/// hash), so re-ingesting an unchanged corpus yields identical ids and the
/// index build can skip re-embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    pub passage_id: String,
    pub ordinal: u32,
    pub text: String,
    pub text_sha256: String,
    pub char_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusManifest {
    /// Label of the ingested source (usually the corpus file path).
    pub source: String,
    pub passage_count: u32,
    pub ingested_at: String, // RFC3339
}
