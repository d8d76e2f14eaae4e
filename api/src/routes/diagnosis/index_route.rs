use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use tracing::{error, info, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ApiErrorDetail, ApiResponse},
    },
    error_handler::AppError,
    routes::diagnosis::diagnosis_request::BuildIndexRequest,
};

/// Rebuilds the medical reference index from the given text documents.
#[instrument(name = "build_index_route", skip_all)]
pub async fn build_index_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BuildIndexRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return ApiResponse::failure(rejection.into(), Vec::new()),
    };

    if req.paths.is_empty() {
        return ApiResponse::failure(
            AppError::BadRequest("`paths` must not be empty".into()),
            vec![ApiErrorDetail::field(
                "paths",
                "Expected .txt or .md paths under the documents directory.",
            )],
        );
    }

    let Some(diagnoser) = &state.diagnoser else {
        return ApiResponse::failure(AppError::Unavailable("diagnosis"), Vec::new());
    };

    match diagnoser.retriever().build(&req.paths).await {
        Ok(stats) => {
            info!(chunks = stats.chunks, collection = %stats.collection, "index rebuilt");
            ApiResponse::success(stats).into_response_with_status(StatusCode::OK)
        }
        Err(err) => {
            error!(error = %err, "build_index_route: failed");
            ApiResponse::failure(err.into(), Vec::new())
        }
    }
}
