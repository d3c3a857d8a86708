//! Retrieval-augmented question answering over PDF documents
//!
//! Features:
//! - PDF loading, one document per page
//! - Fixed-size character chunking with overlap
//! - Cohere embeddings (plus a local hashed embedder for offline use)
//! - Exact cosine vector index with checksum-verified persistence
//! - Explicit index rebuild policy at startup
//! - "Stuff" QA pipeline on top of any `LlmBackend`

pub mod bootstrap;
pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod pipeline;

pub use bootstrap::IndexBootstrap;
pub use chunker::{Chunk, ChunkConfig, TextChunker, TextSpan};
pub use embeddings::{CohereEmbedder, CohereEmbeddingConfig, Embedder, SimpleEmbedder};
pub use index::{SearchHit, VectorIndex};
pub use loader::PdfLoader;
pub use pipeline::{QaAnswer, QaConfig, QaPipeline};

pub use docqa_config::IndexPolicy;

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("No PDF documents found in {0}")]
    NoDocuments(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Index integrity check failed: {0}")]
    Integrity(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}

impl From<docqa_llm::LlmError> for RagError {
    fn from(err: docqa_llm::LlmError) -> Self {
        RagError::Generation(err.to_string())
    }
}

impl From<RagError> for docqa_core::Error {
    fn from(err: RagError) -> Self {
        docqa_core::Error::Rag(err.to_string())
    }
}
