use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use tracing::{debug, error, instrument};

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ApiErrorDetail, ApiResponse},
    },
    error_handler::AppError,
    routes::diagnosis::diagnosis_request::DiagnoseRequest,
};

/// Extracts patient info from the transcript, retrieves context and returns
/// the model's diagnosis in the response envelope.
#[instrument(name = "diagnose_route", skip_all)]
pub async fn diagnose_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return ApiResponse::failure(rejection.into(), Vec::new()),
    };

    if req.transcript.trim().is_empty() {
        return ApiResponse::failure(
            AppError::BadRequest("`transcript` must not be empty".into()),
            vec![ApiErrorDetail::field(
                "transcript",
                "Send the consultation transcript as plain text.",
            )],
        );
    }

    let Some(diagnoser) = &state.diagnoser else {
        return ApiResponse::failure(AppError::Unavailable("diagnosis"), Vec::new());
    };

    debug!(transcript_len = req.transcript.len(), "diagnose_route: start");
    match diagnoser.diagnose(&req.transcript).await {
        Ok(diagnosis) => {
            debug!(sources = diagnosis.sources.len(), "diagnose_route: success");
            ApiResponse::success(diagnosis).into_response_with_status(StatusCode::OK)
        }
        Err(err) => {
            error!(error = %err, "diagnose_route: diagnosis failed");
            ApiResponse::failure(err.into(), Vec::new())
        }
    }
}
