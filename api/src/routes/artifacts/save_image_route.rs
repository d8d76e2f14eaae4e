use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tutor::DRAWING_FILE;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::artifacts::artifacts_request::SaveImageRequest,
};

/// Stores the student's drawing; check-work turns without an image use it.
pub async fn save_image_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveImageRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = payload?;
    if req.image.trim().is_empty() {
        return Err(AppError::BadRequest("`image` must not be empty".into()));
    }

    tutor::save_drawing(state.tutor.config(), &req.image).await?;
    Ok(Json(json!({ "success": true, "fileName": DRAWING_FILE })))
}
