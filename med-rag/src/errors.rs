//! Unified error type for the crate.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MedRagError {
    /// An environment variable holds a value that does not parse.
    #[error("invalid value in {var}: {reason}")]
    EnvParse { var: &'static str, reason: String },

    /// Invalid or inconsistent configuration.
    #[error("config error: {0}")]
    InvalidConfig(String),

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model reply did not decode into the expected JSON shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Embedding call failed or returned a vector of the wrong size.
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(#[from] AiLlmError),

    /// Bounded retry gave up.
    #[error("max attempts reached for {what} after {attempts} tries: {last_error}")]
    MaxAttemptsReached {
        what: &'static str,
        attempts: u32,
        last_error: String,
    },

    #[error("missing prompt template: {}", .0.display())]
    MissingPrompt(PathBuf),

    /// Only UTF-8 text documents can be indexed.
    #[error("unsupported document type: {}", .0.display())]
    UnsupportedDocument(PathBuf),

    /// Index inputs must live under the configured documents directory.
    #[error("document outside the documents directory: {}", .0.display())]
    OutsideDocumentsRoot(PathBuf),
}
