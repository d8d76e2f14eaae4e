//! Lightweight Ollama client for generation, chat and embeddings.
//!
//! - `POST {endpoint}/api/generate`  : single prompt (`stream=false`)
//! - `POST {endpoint}/api/chat`      : message list; images go to `images`
//! - `POST {endpoint}/api/embeddings` : one embedding vector
//!
//! # Examples
//!
//! ```no_run
//! use ai_llm_service::{LlmModelConfig, LlmProvider};
//! use ai_llm_service::services::ollama_service::OllamaService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "nomic-embed-text".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: None,
//!     temperature: Some(0.0),
//!     top_p: None,
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = OllamaService::new(cfg)?;
//! let vec = svc.embeddings("fever and a stiff neck").await?;
//! println!("dim = {}", vec.len());
//! # Ok(()) }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::{
    AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet, transport_err,
};
use crate::message::{ChatMessage, Role};

pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_generate: String,
    url_chat: String,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not `Ollama`
    /// - `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(provider_err(ProviderErrorKind::InvalidProvider));
        }

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(provider_err(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            )));
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            url_generate: format!("{base}/api/generate"),
            url_chat: format!("{base}/api/chat"),
            url_embeddings: format!("{base}/api/embeddings"),
            timeout,
            cfg,
        })
    }

    /// Non-streaming generation via `/api/generate`.
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
            options: GenerateOptions::from_cfg(&self.cfg),
        };

        debug!("POST {}", self.url_generate);
        let out: GenerateResponse = self.post_json(&self.url_generate, &body).await?;
        Ok(out.response)
    }

    /// Non-streaming chat via `/api/chat`.
    ///
    /// Text parts of each message are joined with newlines; image parts are
    /// attached through the message's `images` array (vision models only).
    #[instrument(skip_all, fields(model = %self.cfg.model, messages = messages.len()))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, AiLlmError> {
        let wire = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.joined_text(),
                images: m.images().map(|i| i.data_base64.as_str()).collect(),
            })
            .collect::<Vec<_>>();

        let body = ChatRequest {
            model: &self.cfg.model,
            messages: wire,
            stream: false,
            options: GenerateOptions::from_cfg(&self.cfg),
        };

        debug!("POST {}", self.url_chat);
        let out: ChatResponse = self.post_json(&self.url_chat, &body).await?;
        match out.message.map(|m| m.content) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(provider_err(ProviderErrorKind::EmptyContent)),
        }
    }

    /// Retrieves one embedding vector via `/api/embeddings`.
    #[instrument(skip_all, fields(model = %self.cfg.model, input_len = input.len()))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
        let out: EmbeddingsResponse = self.post_json(&self.url_embeddings, &body).await?;
        if out.embedding.is_empty() {
            return Err(provider_err(ProviderErrorKind::Decode(
                "empty `embedding` array".into(),
            )));
        }
        Ok(out.embedding)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AiLlmError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_err(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(provider_err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })));
        }

        resp.json::<T>().await.map_err(|e| {
            provider_err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; ensure `stream=false` is used"
            )))
        })
    }
}

fn provider_err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::Ollama, kind).into()
}

/* ==========================
HTTP payloads & options
========================== */

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl GenerateOptions {
    fn from_cfg(cfg: &LlmModelConfig) -> Self {
        Self {
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            num_predict: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatOut>,
}

#[derive(Debug, Deserialize)]
struct ChatOut {
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}
