use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub checked_at: String,
    pub llm: Vec<HealthStatus>,
    pub diagnosis_enabled: bool,
    /// Live tutoring sessions.
    pub sessions: usize,
}

/// Probes every configured LLM profile; 503 when any is down.
pub async fn health_route(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let llm = state.llm.health_all().await;
    let ok = llm.iter().all(|s| s.ok);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            ok,
            checked_at: Utc::now().to_rfc3339(),
            llm,
            diagnosis_enabled: state.diagnoser.is_some(),
            sessions: state.sessions.count().await,
        }),
    )
}
