//! Application State
//!
//! Shared state across all handlers.

use parking_lot::RwLock;
use std::sync::Arc;

use docqa_config::Settings;
use docqa_core::ConversationHistory;
use docqa_llm::{GeminiBackend, GeminiConfig, LlmBackend};
use docqa_rag::QaPipeline;
use docqa_speech::{SarvamClient, SarvamClientConfig};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    /// Retrieval QA over the indexed documents
    pub qa: Arc<QaPipeline>,
    /// `None` when no Flash API key is configured
    pub flash: Option<Arc<dyn LlmBackend>>,
    pub system_instruction: Option<String>,
    pub sarvam: Arc<SarvamClient>,
    /// Chat history for `/flash`, shared by every client
    pub history: Arc<ConversationHistory>,
}

impl AppState {
    /// Build the state, wiring vendor clients from configuration
    pub fn new(config: Settings, qa: Arc<QaPipeline>) -> Result<Self, ServerError> {
        let flash: Option<Arc<dyn LlmBackend>> = match config.flash.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                let backend = GeminiBackend::new(GeminiConfig::from(&config.flash))
                    .map_err(|e| ServerError::Startup(e.to_string()))?;
                Some(Arc::new(backend))
            }
            _ => {
                tracing::warn!("Flash API key not set, /flash will return errors");
                None
            }
        };

        let sarvam = SarvamClient::new(SarvamClientConfig::from(&config.sarvam))
            .map_err(|e| ServerError::Startup(e.to_string()))?;
        if !sarvam.has_api_key() {
            tracing::warn!("Sarvam API key not set, speech endpoints will return errors");
        }

        Ok(Self {
            system_instruction: config.flash.system_instruction.clone(),
            history: Arc::new(ConversationHistory::new(config.flash.history_capacity)),
            config: Arc::new(RwLock::new(config)),
            qa,
            flash,
            sarvam: Arc::new(sarvam),
        })
    }

    pub fn with_flash_backend(mut self, backend: Option<Arc<dyn LlmBackend>>) -> Self {
        self.flash = backend;
        self
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    pub fn with_sarvam(mut self, client: SarvamClient) -> Self {
        self.sarvam = Arc::new(client);
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}
