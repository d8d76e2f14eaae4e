use crate::config::llm_provider::LlmProvider;

/// Configuration for one model invocation profile.
///
/// # Fields
///
/// - `provider`: which backend to call.
/// - `model`: model identifier (e.g. `"claude-3-5-sonnet-20241022"`, `"nomic-embed-text"`).
/// - `endpoint`: base URL of the API (no trailing path).
/// - `api_key`: required for Anthropic, unused by Ollama.
/// - `max_tokens`: generation cap. Anthropic requires it; Ollama maps it to `num_predict`.
/// - `temperature`, `top_p`: sampling knobs, sent only when set.
/// - `timeout_secs`: per-request timeout.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Anthropic,
///     model: "claude-3-5-sonnet-20241022".to_string(),
///     endpoint: "https://api.anthropic.com".to_string(),
///     api_key: Some("sk-ant-...".to_string()),
///     max_tokens: Some(4096),
///     temperature: None,
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert_eq!(cfg.provider, LlmProvider::Anthropic);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}
