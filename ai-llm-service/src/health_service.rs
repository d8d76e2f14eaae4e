//! Health probes for the configured LLM backends.
//!
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//! - Anthropic: `GET {endpoint}/v1/models` with `x-api-key` (best-effort model check)
//!
//! [`HealthService::check`] never fails: errors become `ok=false` snapshots.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};
use crate::services::anthropic_service::ANTHROPIC_VERSION;

/// Serializable health snapshot for a single profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Reuses one HTTP client across probes.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Probes one profile; failures are mapped into the returned status.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.probe_ollama(cfg).await,
            LlmProvider::Anthropic => self.probe_anthropic(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        let status = match result {
            Ok((true, msg)) => HealthStatus::new(cfg, true, latency, msg),
            Ok((false, msg)) => HealthStatus::new(cfg, false, latency, msg),
            Err(e) => HealthStatus::new(cfg, false, latency, e.to_string()),
        };

        if status.ok {
            info!(
                provider = %status.provider,
                model = %status.model,
                latency_ms = status.latency_ms,
                "health probe completed"
            );
        } else {
            warn!(
                provider = %status.provider,
                model = %status.model,
                latency_ms = status.latency_ms,
                message = %status.message,
                "health probe failed"
            );
        }
        status
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    async fn probe_ollama(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        #[derive(Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let req = self.client.get(&url).timeout(self.timeout_for(cfg));
        let tags: Tags = self.fetch(req, &url).await?;

        Ok(match tags.models {
            // Ollama reports tags as `name:tag`; accept the bare name too.
            Some(models) if models.iter().any(|m| model_matches(&m.name, &cfg.model)) => {
                (true, "Ollama is healthy; model is available".into())
            }
            Some(_) => (false, "Ollama is up, but model not found in /api/tags".into()),
            None => (true, "Ollama is healthy; tags response without `models`".into()),
        })
    }

    async fn probe_anthropic(&self, cfg: &LlmModelConfig) -> Result<(bool, String), AiLlmError> {
        #[derive(Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| HealthError::Decode("missing Anthropic API key".into()))?;

        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
        let req = self
            .client
            .get(&url)
            .timeout(self.timeout_for(cfg))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let models: Models = self.fetch(req, &url).await?;

        Ok(if models.data.iter().any(|m| m.id == cfg.model) {
            (true, "Anthropic is healthy; model is available".into())
        } else {
            // Aliases and dated snapshots are not always listed.
            (true, "Anthropic is reachable; model not listed in /v1/models".into())
        })
    }

    async fn fetch<T>(&self, req: reqwest::RequestBuilder, url: &str) -> Result<T, AiLlmError>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!("GET {url}");
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
            .into());
        }
        resp.json::<T>()
            .await
            .map_err(|e| HealthError::Decode(e.to_string()).into())
    }

    fn timeout_for(&self, cfg: &LlmModelConfig) -> Duration {
        cfg.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout)
    }
}

fn model_matches(tag: &str, model: &str) -> bool {
    tag == model || tag.split(':').next() == Some(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ollama(endpoint: &str, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(2),
        }
    }

    #[test]
    fn tag_names_match_with_or_without_suffix() {
        assert!(model_matches("nomic-embed-text:latest", "nomic-embed-text"));
        assert!(model_matches("llama3:8b", "llama3:8b"));
        assert!(!model_matches("llama3:8b", "llama3:70b"));
    }

    #[tokio::test]
    async fn ollama_missing_model_is_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "llama3:8b"}]
            })))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        let ok = svc.check(&ollama(&server.uri(), "llama3")).await;
        assert!(ok.ok);
        let missing = svc.check(&ollama(&server.uri(), "nomic-embed-text")).await;
        assert!(!missing.ok);
    }

    #[tokio::test]
    async fn unreachable_backend_maps_to_failed_status() {
        let svc = HealthService::new(Some(1)).unwrap();
        let status = svc.check(&ollama("http://127.0.0.1:9", "x")).await;
        assert!(!status.ok);
        assert_eq!(status.provider, "Ollama");
    }
}
