use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use gqa_core::error::QaError;
use serde::{Deserialize, Serialize};

use super::store::CorpusStore;
use crate::embeddings::Embedder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub model: Option<String>,
    pub dims: Option<u32>,
    pub passage_count: u32,
    pub updated_at: Option<String>,
}

/// Embedding index for the corpus passages: one vector per passage id,
/// plus text hashes so unchanged passages are not re-embedded.
#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

impl IndexStore {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    fn index_dir(&self) -> PathBuf {
        self.root.join("index")
    }

    fn status_path(&self) -> PathBuf {
        self.index_dir().join("index_status.json")
    }

    fn vectors_path(&self) -> PathBuf {
        self.index_dir().join("index_vectors.json")
    }

    fn hashes_path(&self) -> PathBuf {
        self.index_dir().join("index_hashes.json")
    }

    fn ensure_dirs(&self) -> Result<(), QaError> {
        fs::create_dir_all(self.index_dir()).map_err(|e| {
            QaError::new("INDEX_BUILD_FAILED", "Failed to create index directory")
                .with_details(format!("path={}; err={}", self.index_dir().display(), e))
        })
    }

    pub fn status(&self) -> Result<IndexStatus, QaError> {
        self.ensure_dirs()?;
        let path = self.status_path();
        if !path.exists() {
            return Ok(IndexStatus {
                ready: false,
                model: None,
                dims: None,
                passage_count: 0,
                updated_at: None,
            });
        }
        read_json(&path, "index status")
    }

    pub fn read_vectors(&self) -> Result<BTreeMap<String, Vec<f32>>, QaError> {
        self.ensure_dirs()?;
        let path = self.vectors_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        read_json(&path, "index vectors")
    }

    fn read_hashes(&self) -> Result<BTreeMap<String, String>, QaError> {
        self.ensure_dirs()?;
        let path = self.hashes_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        read_json(&path, "index hashes")
    }

    /// Build or refresh the index. Incremental: a passage whose text hash is
    /// unchanged under the same model keeps its stored vector.
    pub fn build(
        &self,
        corpus: &CorpusStore,
        embedder: &dyn Embedder,
        model: &str,
        updated_at: &str,
    ) -> Result<IndexStatus, QaError> {
        self.ensure_dirs()?;

        let passages = corpus.read_passages()?;
        if passages.is_empty() {
            return Err(QaError::new(
                "INDEX_NOT_READY",
                "No passages available; ingest the corpus before building the index",
            ));
        }

        let current = self.status()?;
        let compatible = current.ready && current.model.as_deref() == Some(model);

        let mut vectors = if compatible {
            self.read_vectors()?
        } else {
            BTreeMap::new()
        };
        let mut hashes = if compatible {
            self.read_hashes()?
        } else {
            BTreeMap::new()
        };

        // Drop entries for passages that no longer exist.
        let wanted: BTreeSet<String> = passages.iter().map(|p| p.passage_id.clone()).collect();
        vectors.retain(|k, _| wanted.contains(k));
        hashes.retain(|k, _| wanted.contains(k));

        let mut dims: Option<u32> = if compatible { current.dims } else { None };

        for passage in passages.iter() {
            let unchanged = hashes.get(&passage.passage_id) == Some(&passage.text_sha256)
                && vectors.contains_key(&passage.passage_id);
            if unchanged {
                continue;
            }
            let v = embedder.embed(model, &passage.text).map_err(|e| {
                QaError::new("INDEX_BUILD_FAILED", "Failed to embed corpus passage")
                    .with_details(format!("passage_id={}; err={}", passage.passage_id, e))
                    .with_retryable(e.retryable)
            })?;
            let this_dims = v.len() as u32;
            match dims {
                Some(d) if d != this_dims => {
                    return Err(QaError::new(
                        "INDEX_BUILD_FAILED",
                        "Embedding dimension mismatch across passages",
                    )
                    .with_details(format!(
                        "expected={}; got={}; passage_id={}",
                        d, this_dims, passage.passage_id
                    )));
                }
                Some(_) => {}
                None => dims = Some(this_dims),
            }
            vectors.insert(passage.passage_id.clone(), v);
        }

        for passage in passages.iter() {
            hashes.insert(passage.passage_id.clone(), passage.text_sha256.clone());
        }

        // Persist only after every embedding succeeded.
        write_json(&self.vectors_path(), &vectors, "index vectors")?;
        write_json(&self.hashes_path(), &hashes, "index hashes")?;

        let status = IndexStatus {
            ready: true,
            model: Some(model.to_string()),
            dims,
            passage_count: vectors.len() as u32,
            updated_at: Some(updated_at.to_string()),
        };
        write_json(&self.status_path(), &status, "index status")?;
        Ok(status)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T, QaError> {
    let bytes = fs::read(path).map_err(|e| {
        QaError::new("INDEX_BUILD_FAILED", format!("Failed to read {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        QaError::new("INDEX_BUILD_FAILED", format!("Failed to decode {what}"))
            .with_details(format!("path={}; err={}", path.display(), e))
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, what: &str) -> Result<(), QaError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        QaError::new("INDEX_BUILD_FAILED", format!("Failed to encode {what}"))
            .with_details(e.to_string())
    })?;
    fs::write(&tmp, json.as_bytes()).map_err(|e| {
        QaError::new("INDEX_BUILD_FAILED", format!("Failed to write {what}"))
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        QaError::new("INDEX_BUILD_FAILED", format!("Failed to finalize {what} write"))
            .with_details(format!(
                "tmp={}; dest={}; err={}",
                tmp.display(),
                path.display(),
                e
            ))
    })?;
    Ok(())
}
