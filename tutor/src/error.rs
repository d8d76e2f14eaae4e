//! Typed error for the tutor crate.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    /// The LLM call failed (transport, status, decode).
    #[error("LLM error: {0}")]
    Llm(#[from] AiLlmError),

    /// Reading a prompt or an artifact failed.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required prompt template is not in the prompts directory.
    #[error("missing prompt template: {}", .0.display())]
    MissingPrompt(PathBuf),

    /// Uploaded image could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}
