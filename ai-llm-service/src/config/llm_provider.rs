use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Backend used for large language model inference.
///
/// Anthropic serves the tutoring chat (text and images); Ollama serves local
/// generation and, more importantly, embeddings, which Anthropic does not offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Hosted Anthropic Messages API.
    Anthropic,
    /// Local Ollama runtime.
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    /// Parses `LLM_KIND` values, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
