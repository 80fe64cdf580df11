pub mod corpus;
pub mod embeddings;
pub mod grade;
pub mod guardrails;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;
pub mod synthesize;

#[cfg(test)]
mod tests {
    use super::corpus::CorpusStore;
    use super::guardrails::unknown_cited_ids;
    use super::ollama::OllamaClient;
    use gqa_core::domain::EvidenceBundle;

    #[test]
    fn enforces_localhost_only_base_url() {
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1").is_ok());

        assert!(OllamaClient::new("http://localhost:11434").is_err());
        assert!(OllamaClient::new("http://0.0.0.0:11434").is_err());
        assert!(OllamaClient::new("http://[::1]:11434").is_err());
        assert!(OllamaClient::new("https://example.com").is_err());

        // Harden against prefix-based bypasses.
        assert!(OllamaClient::new("http://127.0.0.1.evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1@evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:0").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:99999").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434/").is_ok()); // trailing slash is trimmed
        assert!(OllamaClient::new("http://127.0.0.1:11434/api").is_err());
    }

    #[test]
    fn corpus_ingest_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CorpusStore::open(dir.path().to_path_buf());
        let manifest = store
            .ingest_text("sample", "first paragraph\n\nsecond paragraph", "2026-08-08T00:00:00Z")
            .expect("ingest");
        assert_eq!(manifest.passage_count, 1);

        let passages = store.read_passages().expect("read");
        assert_eq!(passages.len(), 1);
        let got = store.get_passage(&passages[0].passage_id).expect("get");
        assert_eq!(got, passages[0]);
    }

    #[test]
    fn citation_guard_flags_fabricated_ids() {
        let bundle = EvidenceBundle::empty();
        assert_eq!(
            unknown_cited_ids("claim [[passage:ghost]]", &bundle),
            vec!["ghost".to_string()]
        );
    }
}
