use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::tutor::{
        generate_route::session_id_or_default, tutor_request::ResetSessionRequest,
        tutor_response::ResetSessionResponse,
    },
};

/// Forgets a session so the next turn starts with topic detection again.
///
/// The body is optional; an empty body resets the default session.
pub async fn reset_session_route(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<ResetSessionResponse>> {
    let req: ResetSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ResetSessionRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let session_id = session_id_or_default(req.session_id.as_deref()).to_string();
    let existed = state.sessions.reset(&session_id).await;
    info!(%session_id, existed, "session reset");

    Ok(Json(ResetSessionResponse {
        session_id,
        reset: true,
    }))
}
