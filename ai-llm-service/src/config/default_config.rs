//! Default LLM configs loaded from environment variables.
//!
//! Two roles are used by the application:
//!
//! - **Chat**      → tutoring conversation, practice problems, diagnosis prompts
//! - **Embedding** → vectors for the medical reference index
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = chat provider (`anthropic` by default, or `ollama`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! Anthropic:
//! - `ANTHROPIC_API_KEY` (mandatory when `LLM_KIND=anthropic`)
//! - `ANTHROPIC_URL`   (default `https://api.anthropic.com`)
//! - `ANTHROPIC_MODEL` (default `claude-3-5-sonnet-20241022`)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`    = chat model when `LLM_KIND=ollama` (mandatory then)
//! - `EMBEDDING_MODEL` = embedding model (default `nomic-embed-text`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_or, must_env, validate_http_endpoint,
    },
};

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// The Messages API rejects requests without `max_tokens`.
const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4096;

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            validate_http_endpoint("OLLAMA_URL", url.trim())?;
            return Ok(url.trim().to_string());
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Ok("http://localhost:11434".to_string())
}

/// Chat profile chosen by `LLM_KIND` (defaults to Anthropic).
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let kind = env_or("LLM_KIND", "anthropic").parse::<LlmProvider>()?;
    match kind {
        LlmProvider::Anthropic => config_anthropic_chat(),
        LlmProvider::Ollama => config_ollama_chat(),
    }
}

/// Anthropic chat profile.
///
/// # Defaults
/// - `max_tokens = 4096` unless `LLM_MAX_TOKENS` is set
/// - `timeout_secs = Some(120)`
pub fn config_anthropic_chat() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("ANTHROPIC_API_KEY")?;
    let endpoint = env_or("ANTHROPIC_URL", DEFAULT_ANTHROPIC_URL);
    validate_http_endpoint("ANTHROPIC_URL", &endpoint)?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Anthropic,
        model: env_or("ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS)),
        temperature: None,
        top_p: None,
        timeout_secs: Some(120),
    })
}

/// Ollama chat profile (`OLLAMA_MODEL` required).
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `top_p = Some(0.9)`
/// - `timeout_secs = Some(600)`
pub fn config_ollama_chat() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("OLLAMA_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.7),
        top_p: Some(0.9),
        timeout_secs: Some(600),
    })
}

/// Ollama embedding profile.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(30)`
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}
