use std::fs;
use std::path::{Path, PathBuf};

use gqa_core::error::QaError;
use sha2::{Digest, Sha256};

use super::chunking::{split_passages, MAX_PASSAGE_CHARS};
use super::model::{CorpusManifest, Passage};

/// On-disk passage store for one corpus: `passages.json` plus a manifest,
/// written atomically (tmp then rename).
#[derive(Debug, Clone)]
pub struct CorpusStore {
    root: PathBuf,
}

impl CorpusStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn passages_path(&self) -> PathBuf {
        self.root.join("passages.json")
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join("corpus_manifest.json")
    }

    fn ensure_dirs(&self) -> Result<(), QaError> {
        fs::create_dir_all(self.root.as_path()).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to create corpus store directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })
    }

    /// Ingest a UTF-8 corpus file, replacing any previously stored passages.
    pub fn ingest_file(&self, corpus_path: &Path, ingested_at: &str) -> Result<CorpusManifest, QaError> {
        let text = fs::read_to_string(corpus_path).map_err(|e| {
            QaError::new("CORPUS_SOURCE_INVALID", "Failed to read corpus file")
                .with_details(format!("path={}; err={}", corpus_path.display(), e))
        })?;
        self.ingest_text(&corpus_path.to_string_lossy(), &text, ingested_at)
    }

    /// Ingest corpus text directly under a source label.
    pub fn ingest_text(
        &self,
        source: &str,
        text: &str,
        ingested_at: &str,
    ) -> Result<CorpusManifest, QaError> {
        self.ensure_dirs()?;

        let normalized = normalize_text(text);
        let drafts = split_passages(&normalized, MAX_PASSAGE_CHARS);
        if drafts.is_empty() {
            return Err(QaError::new(
                "CORPUS_SOURCE_INVALID",
                "Corpus contains no usable text",
            )
            .with_details(format!("source={source}")));
        }

        let passages: Vec<Passage> = drafts
            .into_iter()
            .map(|d| {
                let text_sha256 = sha256_hex(d.text.as_bytes());
                let passage_id =
                    sha256_hex(format!("v1|{}|{}|{}", source, d.ordinal, text_sha256).as_bytes());
                Passage {
                    passage_id,
                    ordinal: d.ordinal,
                    char_count: d.text.len().min(u32::MAX as usize) as u32,
                    text: d.text,
                    text_sha256,
                }
            })
            .collect();

        self.write_json(&self.passages_path(), &passages)?;

        let manifest = CorpusManifest {
            source: source.to_string(),
            passage_count: passages.len() as u32,
            ingested_at: ingested_at.to_string(),
        };
        self.write_json(&self.manifest_path(), &manifest)?;

        Ok(manifest)
    }

    pub fn read_passages(&self) -> Result<Vec<Passage>, QaError> {
        let path = self.passages_path();
        if !path.exists() {
            return Err(QaError::new(
                "CORPUS_NOT_READY",
                "No passages stored; ingest a corpus first",
            ));
        }
        let bytes = fs::read(&path).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to read stored passages")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to decode stored passages")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    pub fn get_passage(&self, passage_id: &str) -> Result<Passage, QaError> {
        self.read_passages()?
            .into_iter()
            .find(|p| p.passage_id == passage_id)
            .ok_or_else(|| {
                QaError::new("CORPUS_PASSAGE_NOT_FOUND", "Corpus passage not found")
                    .with_details(format!("passage_id={passage_id}"))
            })
    }

    pub fn manifest(&self) -> Result<Option<CorpusManifest>, QaError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to read corpus manifest")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to decode corpus manifest")
                .with_details(format!("path={}; err={}", path.display(), e))
        })
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<(), QaError> {
        let tmp = path.with_extension("tmp");
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to encode corpus data")
                .with_details(e.to_string())
        })?;
        fs::write(&tmp, json.as_bytes()).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to write corpus data")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            QaError::new("CORPUS_STORE_FAILED", "Failed to finalize corpus data write")
                .with_details(format!(
                    "tmp={}; dest={}; err={}",
                    tmp.display(),
                    path.display(),
                    e
                ))
        })?;
        Ok(())
    }
}

pub(crate) fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}
