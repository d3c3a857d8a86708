//! Question answering with a recording generation backend

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use docqa_core::DocumentSource;
use docqa_llm::{FinishReason, GenerationResult, LlmBackend, LlmError, Message};
use docqa_rag::{Chunk, Embedder, QaConfig, QaPipeline, RagError, SimpleEmbedder, VectorIndex};

#[derive(Default)]
struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl LlmBackend for RecordingLlm {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        if self.fail {
            return Err(LlmError::Api("model unavailable".to_string()));
        }
        self.prompts.lock().push(messages[0].content.clone());
        Ok(GenerationResult {
            text: "  Gold loans carry 9% interest.\n".to_string(),
            total_time_ms: 1,
            finish_reason: FinishReason::Stop,
        })
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

fn index(embedder: &SimpleEmbedder, texts: &[&str]) -> Arc<VectorIndex> {
    let chunks: Vec<Chunk> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            text: text.to_string(),
            source: DocumentSource::new("rates.pdf", 1),
            index: i,
            start_char: 0,
            end_char: text.chars().count(),
        })
        .collect();
    let vectors = texts.iter().map(|t| embedder.embed_sync(t)).collect();
    Arc::new(VectorIndex::build(chunks, vectors, embedder.model_name()).unwrap())
}

#[tokio::test]
async fn test_answer_uses_top_k_chunks() {
    let embedder = SimpleEmbedder::new(128);
    let index = index(
        &embedder,
        &[
            "The gold loan interest rate is 9% per year.",
            "Branches open at nine in the morning.",
            "Gold loan tenure ranges from 3 to 12 months.",
        ],
    );
    let llm = Arc::new(RecordingLlm::default());
    let pipeline = QaPipeline::new(
        index,
        Arc::new(embedder),
        llm.clone(),
        QaConfig { top_k: 2 },
    );

    let answer = pipeline.answer("What is the gold loan interest rate?").await.unwrap();

    assert_eq!(answer.answer, "  Gold loans carry 9% interest.\n");
    assert_eq!(answer.sources.len(), 2);
    assert_eq!(
        answer.sources[0].chunk.text,
        "The gold loan interest rate is 9% per year."
    );

    let prompts = llm.prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("The gold loan interest rate is 9% per year."));
    assert!(!prompts[0].contains("Branches open"));
    assert!(prompts[0].ends_with("Question: What is the gold loan interest rate?\nHelpful Answer:"));
}

#[tokio::test]
async fn test_generation_failure_surfaces() {
    let embedder = SimpleEmbedder::new(16);
    let index = index(&embedder, &["anything"]);
    let llm = Arc::new(RecordingLlm {
        fail: true,
        ..Default::default()
    });
    let pipeline = QaPipeline::new(index, Arc::new(embedder), llm, QaConfig::default());

    assert!(matches!(
        pipeline.answer("question").await,
        Err(RagError::Generation(_))
    ));
}
