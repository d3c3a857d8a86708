//! Question answering over the vector index
//!
//! Embeds the question, retrieves the nearest chunks and "stuffs" them into a
//! single prompt for the generation backend.

use std::sync::Arc;

use docqa_llm::{LlmBackend, Message};

use crate::embeddings::Embedder;
use crate::index::{SearchHit, VectorIndex};
use crate::RagError;

const STUFF_PREAMBLE: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Pipeline configuration
#[derive(Debug, Clone, Copy)]
pub struct QaConfig {
    /// Chunks placed in the prompt
    pub top_k: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            top_k: docqa_config::constants::rag::DEFAULT_TOP_K,
        }
    }
}

impl From<&docqa_config::RagConfig> for QaConfig {
    fn from(config: &docqa_config::RagConfig) -> Self {
        Self {
            top_k: config.top_k,
        }
    }
}

/// Generated answer plus the chunks it was grounded on
#[derive(Debug, Clone)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<SearchHit>,
}

/// Retrieval-augmented QA
pub struct QaPipeline {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LlmBackend>,
    config: QaConfig,
}

impl QaPipeline {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmBackend>,
        config: QaConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            config,
        }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Nearest chunks for a question
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>, RagError> {
        let vector = self.embedder.embed_query(query).await?;
        self.index.query(&vector, self.config.top_k)
    }

    /// Answer a question from the indexed documents
    pub async fn answer(&self, query: &str) -> Result<QaAnswer, RagError> {
        let sources = self.retrieve(query).await?;
        let prompt = build_prompt(query, &sources);

        tracing::debug!(
            hits = sources.len(),
            prompt_chars = prompt.len(),
            model = self.llm.model_name(),
            "Generating answer"
        );

        let result = self.llm.generate(&[Message::user(prompt)]).await?;

        Ok(QaAnswer {
            answer: result.text,
            sources,
        })
    }
}

/// Fill the stuff template with the retrieved chunks
pub fn build_prompt(question: &str, hits: &[SearchHit]) -> String {
    let context = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        STUFF_PREAMBLE, context, question
    )
}
