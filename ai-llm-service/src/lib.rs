//! Shared LLM access layer used by the tutor and the diagnosis pipeline.
//!
//! - [`config`]: provider enum, per-model config, env-driven defaults.
//! - [`message`]: provider-agnostic chat messages with text and image parts.
//! - [`services`]: thin HTTP clients for Anthropic and Ollama.
//! - [`service_profiles`]: the `chat` + `embedding` profile pair shared via `Arc`.
//! - [`health_service`]: resilient probes for a `/health` endpoint.
//! - [`telemetry`]: library-scoped tracing layer.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod message;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use message::{ChatMessage, ContentPart, ImageData, Role};
pub use service_profiles::LlmServiceProfiles;
