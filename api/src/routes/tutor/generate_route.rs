use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{Span, debug, info, instrument};
use tutor::{DEFAULT_SESSION_ID, decode_image};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::tutor::{tutor_request::GenerateRequest, tutor_response::GenerateResponse},
};

/// Runs one tutoring turn for the session named in the request.
///
/// Turns of the same session are serialized by the session lock; different
/// sessions proceed concurrently.
#[instrument(name = "generate_route", skip_all, fields(session_id = tracing::field::Empty))]
pub async fn generate_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> AppResult<Json<GenerateResponse>> {
    let Json(req) = payload?;

    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest("`body` must not be empty".into()));
    }
    let submission = match req.image.as_deref().map(str::trim) {
        Some(img) if !img.is_empty() => Some(decode_image(img)?),
        _ => None,
    };

    let session_id = session_id_or_default(req.session_id.as_deref());
    Span::current().record("session_id", session_id);
    debug!(has_image = submission.is_some(), "turn received");

    let session = state.sessions.get_or_create(&state.tutor, session_id).await;
    let mut session = session.lock().await;
    let reply = state.tutor.respond(&mut session, &req.body, submission).await?;

    info!(
        intent = ?reply.intent,
        has_diagram = reply.diagram.is_some(),
        "turn answered"
    );

    Ok(Json(GenerateResponse {
        output: reply.text,
        diagram: reply.diagram,
        intent: reply.intent,
        topic: session.topic().map(str::to_string),
    }))
}

pub(crate) fn session_id_or_default(id: Option<&str>) -> &str {
    id.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
}
