//! Vector Index
//!
//! Exact cosine-similarity index over chunk embeddings. Vectors are
//! L2-normalised at build time so a query is a dot product per chunk.
//!
//! The index persists as a bincode artifact with a SHA-256 digest written
//! next to it (`<path>.sha256`). Loading recomputes the digest and refuses
//! the artifact on mismatch before any deserialization happens.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::chunker::Chunk;
use crate::RagError;

/// Artifact format version
const FORMAT_VERSION: u32 = 1;

/// A retrieved chunk with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    version: u32,
    dimension: usize,
    /// Embedding model that produced the vectors
    model: String,
    entries: Vec<Entry>,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings (same order)
    pub fn build(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        model: impl Into<String>,
    ) -> Result<Self, RagError> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Err(RagError::Index("cannot build an empty index".to_string()));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(RagError::Index("embeddings have zero dimension".to_string()));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for (i, (chunk, mut vector)) in chunks.into_iter().zip(embeddings).enumerate() {
            if vector.len() != dimension {
                return Err(RagError::Index(format!(
                    "embedding {} has dimension {}, expected {}",
                    i,
                    vector.len(),
                    dimension
                )));
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(RagError::Index(format!(
                    "embedding {} contains non-finite values",
                    i
                )));
            }
            normalize(&mut vector);
            entries.push(Entry { chunk, vector });
        }

        Ok(Self {
            version: FORMAT_VERSION,
            dimension,
            model: model.into(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Top `k` chunks by cosine similarity, best first
    ///
    /// Ties keep index order. `k == 0` returns nothing; `k` larger than the
    /// index returns every chunk.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, RagError> {
        if vector.len() != self.dimension {
            return Err(RagError::Index(format!(
                "query has dimension {}, index has {}",
                vector.len(),
                self.dimension
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut query = vector.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, dot(&e.vector, &query)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Write the artifact and its checksum, creating parent directories
    pub fn persist(&self, path: &Path) -> Result<(), RagError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let bytes =
            bincode::serialize(self).map_err(|e| RagError::Serialization(e.to_string()))?;
        std::fs::write(path, &bytes)?;
        std::fs::write(checksum_path(path), sha256_hex(&bytes))?;

        tracing::info!(
            path = %path.display(),
            chunks = self.len(),
            bytes = bytes.len(),
            "Persisted vector index"
        );
        Ok(())
    }

    /// Load a persisted artifact after verifying its checksum
    pub fn load(path: &Path) -> Result<Self, RagError> {
        let bytes = std::fs::read(path)?;
        let expected = std::fs::read_to_string(checksum_path(path)).map_err(|e| {
            RagError::Integrity(format!("missing checksum for {}: {}", path.display(), e))
        })?;

        if sha256_hex(&bytes) != expected.trim() {
            return Err(RagError::Integrity(format!(
                "checksum mismatch for {}",
                path.display()
            )));
        }

        let index: VectorIndex =
            bincode::deserialize(&bytes).map_err(|e| RagError::Serialization(e.to_string()))?;

        if index.version != FORMAT_VERSION {
            return Err(RagError::Integrity(format!(
                "unsupported index format version {}",
                index.version
            )));
        }
        if index.entries.iter().any(|e| e.vector.len() != index.dimension) {
            return Err(RagError::Integrity(
                "stored vectors disagree with index dimension".to_string(),
            ));
        }

        tracing::info!(
            path = %path.display(),
            chunks = index.len(),
            dimension = index.dimension,
            "Loaded vector index"
        );
        Ok(index)
    }

    /// Remove a persisted artifact and its checksum, if present
    pub fn remove(path: &Path) -> Result<(), RagError> {
        for file in [path.to_path_buf(), checksum_path(path)] {
            match std::fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// `<path>.sha256`
pub fn checksum_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".sha256");
    PathBuf::from(name)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
