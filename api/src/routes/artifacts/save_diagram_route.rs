use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::artifacts::artifacts_request::SaveDiagramRequest,
};

pub async fn save_diagram_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveDiagramRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = payload?;
    if req.diagram.trim().is_empty() {
        return Err(AppError::BadRequest("`diagram` must not be empty".into()));
    }

    tutor::save_diagram(state.tutor.config(), &req.diagram).await?;
    Ok(Json(json!({ "message": "Diagram saved successfully!" })))
}
