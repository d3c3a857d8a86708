//! Index bootstrap
//!
//! Produces the [`VectorIndex`] the server starts with, following the
//! configured [`IndexPolicy`].

use std::path::PathBuf;
use std::sync::Arc;

use docqa_config::{IndexPolicy, RagConfig};

use crate::chunker::{Chunk, ChunkConfig, TextChunker};
use crate::embeddings::Embedder;
use crate::index::VectorIndex;
use crate::loader::PdfLoader;
use crate::RagError;

/// Loads or builds the vector index at startup
pub struct IndexBootstrap {
    docs_dir: PathBuf,
    index_path: PathBuf,
    policy: IndexPolicy,
    chunk_config: ChunkConfig,
    embedder: Arc<dyn Embedder>,
}

impl IndexBootstrap {
    pub fn new(config: &RagConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            docs_dir: PathBuf::from(&config.docs_dir),
            index_path: PathBuf::from(&config.index_path),
            policy: config.index_policy,
            chunk_config: ChunkConfig::from(config),
            embedder,
        }
    }

    pub fn with_policy(mut self, policy: IndexPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Apply the policy and return a ready index
    ///
    /// The document set is loaded and checked under every policy, so an
    /// empty `docs_dir` fails startup even when a persisted index exists.
    pub async fn prepare(&self) -> Result<VectorIndex, RagError> {
        let chunks = self.load_chunks().await?;

        match self.policy {
            IndexPolicy::AlwaysRebuild => {
                tracing::info!(path = %self.index_path.display(), "Rebuilding vector index");
                VectorIndex::remove(&self.index_path)?;
                self.build_and_persist(chunks).await
            }
            IndexPolicy::LoadOrBuild => {
                if !self.index_path.exists() {
                    tracing::info!(
                        path = %self.index_path.display(),
                        "No persisted index, building from documents"
                    );
                    return self.build_and_persist(chunks).await;
                }

                match VectorIndex::load(&self.index_path) {
                    Ok(index) if index.model() == self.embedder.model_name() => Ok(index),
                    Ok(index) => {
                        tracing::warn!(
                            stored = index.model(),
                            current = self.embedder.model_name(),
                            "Persisted index was built with another embedding model, rebuilding"
                        );
                        self.build_and_persist(chunks).await
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %self.index_path.display(),
                            error = %e,
                            "Persisted index failed verification, rebuilding"
                        );
                        self.build_and_persist(chunks).await
                    }
                }
            }
        }
    }

    async fn load_chunks(&self) -> Result<Vec<Chunk>, RagError> {
        let chunker = TextChunker::new(self.chunk_config)?;
        let loader = PdfLoader::new(self.docs_dir.clone());

        // lopdf parsing is blocking
        let documents = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| RagError::Io(format!("document loader task failed: {}", e)))??;

        let chunks = chunker.split_documents(&documents);
        if chunks.is_empty() {
            return Err(RagError::NoDocuments(format!(
                "{} (no extractable text)",
                self.docs_dir.display()
            )));
        }

        tracing::debug!(
            documents = documents.len(),
            chunks = chunks.len(),
            "Loaded source documents"
        );
        Ok(chunks)
    }

    async fn build_and_persist(&self, chunks: Vec<Chunk>) -> Result<VectorIndex, RagError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let index = VectorIndex::build(chunks, embeddings, self.embedder.model_name())?;
        index.persist(&self.index_path)?;

        tracing::info!(
            chunks = index.len(),
            dimension = index.dimension(),
            model = index.model(),
            "Built vector index"
        );
        Ok(index)
    }
}
