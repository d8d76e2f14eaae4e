//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches HTTP clients per config (provider+endpoint+model+key+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//!
//! let txt = svc.generate("Name one balanced binary search tree.").await?;
//! println!("CHAT: {txt}");
//!
//! let emb = svc.embed("chest pain radiating to the left arm").await?;
//! println!("Embedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    config::{
        default_config::{config_chat_from_env, config_ollama_embedding},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::{AiLlmError, ProviderError, ProviderErrorKind},
    health_service::{HealthService, HealthStatus},
    message::ChatMessage,
    services::{anthropic_service::AnthropicService, ollama_service::OllamaService},
};

pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,

    anthropic: RwLock<HashMap<ClientKey, Arc<AnthropicService>>>,
    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service from explicit profiles.
    ///
    /// `health_timeout_secs` bounds each health probe (default 10s).
    pub fn new(
        chat: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            chat,
            embedding,
            anthropic: RwLock::new(HashMap::new()),
            ollama: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds both profiles from environment variables, see [`crate::config::default_config`].
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_chat_from_env()?, config_ollama_embedding()?, None)
    }

    /// Sends one user text message on the chat profile.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        match self.chat.provider {
            LlmProvider::Anthropic => {
                let cli = self.anthropic_client(&self.chat).await?;
                cli.generate(&[ChatMessage::user_text(prompt)], None).await
            }
            LlmProvider::Ollama => {
                let cli = self.ollama_client(&self.chat).await?;
                cli.generate(prompt).await
            }
        }
    }

    /// Sends a (possibly multimodal) conversation on the chat profile.
    pub async fn generate_messages(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        match self.chat.provider {
            LlmProvider::Anthropic => {
                let cli = self.anthropic_client(&self.chat).await?;
                cli.generate(messages, None).await
            }
            LlmProvider::Ollama => {
                let cli = self.ollama_client(&self.chat).await?;
                cli.chat(messages).await
            }
        }
    }

    /// Computes one embedding on the embedding profile.
    ///
    /// # Errors
    /// `Unsupported` when the embedding profile points at Anthropic, which has
    /// no embeddings endpoint.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.ollama_client(&self.embedding).await?;
                cli.embeddings(input).await
            }
            LlmProvider::Anthropic => Err(ProviderError::new(
                LlmProvider::Anthropic,
                ProviderErrorKind::Unsupported("embeddings"),
            )
            .into()),
        }
    }

    /// Health snapshot for the distinct profiles (checked once when equal).
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.chat.clone()];
        if self.embedding != self.chat {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns `(chat, embedding)` profiles.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn anthropic_client(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<AnthropicService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.anthropic.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.anthropic.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(AnthropicService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn ollama_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
