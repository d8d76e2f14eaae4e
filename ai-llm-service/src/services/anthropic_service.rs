//! Anthropic Messages API client.
//!
//! Minimal, non-streaming client around `POST {endpoint}/v1/messages`.
//! Supports interleaved text and base64 image blocks, which the check-work
//! flow relies on.
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::Anthropic`
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, ProviderError, ProviderErrorKind, make_snippet, transport_err,
    },
    message::{ChatMessage, ContentPart, Role},
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Same default the Messages API examples use; only applies when the config has none.
const FALLBACK_MAX_TOKENS: u32 = 4096;

#[derive(Debug)]
pub struct AnthropicService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_messages: String,
    timeout: Duration,
}

impl AnthropicService {
    /// Creates a new [`AnthropicService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` / `MissingApiKey` / `InvalidEndpoint` provider errors
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Anthropic {
            return Err(provider_err(ProviderErrorKind::InvalidProvider));
        }

        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| provider_err(ProviderErrorKind::MissingApiKey))?;

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
            .unwrap_or_else(|| Duration::from_secs(120));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&api_key).map_err(|e| {
                provider_err(ProviderErrorKind::Decode(format!(
                    "invalid API key header: {e}"
                )))
            })?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_messages = format!("{}/v1/messages", endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "AnthropicService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_messages,
            timeout,
        })
    }

    /// Sends `messages` (optionally with a system prompt) and returns the
    /// concatenated text blocks of the reply.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::Timeout`] when the call exceeds `timeout_secs`
    /// - [`AiLlmError::HttpTransport`] for other client/network failures
    /// - `Decode` if the JSON cannot be parsed
    /// - `EmptyContent` if the reply has no text block
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = MessagesRequest::from_cfg(&self.cfg, messages, system);

        debug!(
            model = %self.cfg.model,
            messages = messages.len(),
            images = messages.iter().map(|m| m.images().count()).sum::<usize>(),
            has_system = system.is_some(),
            "POST {}", self.url_messages
        );

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_messages.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "Anthropic /v1/messages returned non-success status"
            );

            return Err(provider_err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })));
        }

        let out: MessagesResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode /v1/messages response"
            );
            provider_err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `content[].text`"
            )))
        })?;

        let text = out
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(provider_err(ProviderErrorKind::EmptyContent));
        }

        info!(
            model = %self.cfg.model,
            stop_reason = out.stop_reason.as_deref().unwrap_or("n/a"),
            latency_ms = started.elapsed().as_millis(),
            "messages call completed"
        );

        Ok(text)
    }
}

fn provider_err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(LlmProvider::Anthropic, kind).into()
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl<'a> MessagesRequest<'a> {
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        messages: &'a [ChatMessage],
        system: Option<&'a str>,
    ) -> Self {
        Self {
            model: &cfg.model,
            max_tokens: cfg.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            messages: messages.iter().map(WireMessage::from).collect(),
            system,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: Vec<WireBlock<'a>>,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        let content = msg
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => WireBlock::Text { text },
                ContentPart::Image(img) => WireBlock::Image {
                    source: ImageSource {
                        kind: "base64",
                        media_type: &img.media_type,
                        data: &img.data_base64,
                    },
                },
            })
            .collect();
        Self {
            role: msg.role,
            content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireBlock<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
