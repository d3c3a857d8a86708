//! Text Embeddings
//!
//! [`Embedder`] is the seam between the pipeline and whatever produces
//! vectors. [`CohereEmbedder`] calls the hosted Cohere embed API;
//! [`SimpleEmbedder`] is a deterministic hashed bag-of-words embedder that
//! needs no network and is used for tests and offline development.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

use crate::RagError;

/// Converts text into fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Embed many texts, one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embed a search query (some models embed queries differently)
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        self.embed(query).await
    }

    /// Vector dimension, when known up front
    fn dimension(&self) -> Option<usize>;

    fn model_name(&self) -> &str;
}

/// Cohere embedding configuration
#[derive(Debug, Clone)]
pub struct CohereEmbeddingConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    /// Sent as `X-Client-Name`
    pub client_name: String,
    /// Texts per request (Cohere caps this at 96)
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for CohereEmbeddingConfig {
    fn default() -> Self {
        Self::from(&docqa_config::CohereConfig::default())
    }
}

impl From<&docqa_config::CohereConfig> for CohereEmbeddingConfig {
    fn from(config: &docqa_config::CohereConfig) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            model: config.embed_model.clone(),
            client_name: config.client_name.clone(),
            batch_size: config.embed_batch_size,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl CohereEmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// v3 models require an input type, older ones ignore it
    fn input_types(&self) -> bool {
        self.model.contains("-v3")
    }
}

/// Request to the Cohere embed API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    truncate: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_type: Option<&'static str>,
}

/// Response from the Cohere embed API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Cohere embedder
pub struct CohereEmbedder {
    client: Client,
    config: CohereEmbeddingConfig,
}

impl CohereEmbedder {
    pub fn new(config: CohereEmbeddingConfig) -> Result<Self, RagError> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::Embedding(
                "COHERE_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }
        if config.batch_size == 0 {
            return Err(RagError::InvalidConfig(
                "embedding batch size must be at least 1".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn request(
        &self,
        texts: &[String],
        input_type: &'static str,
    ) -> Result<Vec<Vec<f32>>, RagError> {
        let request = EmbedRequest {
            model: &self.config.model,
            texts,
            truncate: "END",
            input_type: self.config.input_types().then_some(input_type),
        };

        let url = format!("{}/v1/embed", self.config.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-Client-Name", &self.config.client_name)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("Cohere request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "Cohere embedding failed: {} - {}",
                status, text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("Failed to parse Cohere response: {}", e)))?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embed_response.embeddings.len()
            )));
        }

        Ok(embed_response.embeddings)
    }
}

#[async_trait]
impl Embedder for CohereEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let texts = [text.to_string()];
        self.request(&texts, "search_document")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch, group) in texts.chunks(self.config.batch_size).enumerate() {
            tracing::debug!(batch, size = group.len(), "Embedding batch");
            embeddings.extend(self.request(group, "search_document").await?);
        }
        Ok(embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        let texts = [query.to_string()];
        self.request(&texts, "search_query")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("No embedding returned".to_string()))
    }

    fn dimension(&self) -> Option<usize> {
        None
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Hashed bag-of-words embedder
///
/// Each lowercase word is hashed into one of `dimension` buckets; the vector
/// is L2-normalised. Texts sharing words end up close under cosine similarity.
#[derive(Debug, Clone)]
pub struct SimpleEmbedder {
    dimension: usize,
}

impl SimpleEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];

        for word in text.unicode_words() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() % self.dimension as u64) as usize;
            embedding[idx] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for SimpleEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for SimpleEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn model_name(&self) -> &str {
        "simple-hash"
    }
}
