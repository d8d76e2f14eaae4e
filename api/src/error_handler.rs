use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use med_rag::MedRagError;
use serde::Serialize;
use thiserror::Error;
use tutor::TutorError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} is not available")]
    Unavailable(&'static str),

    /// Error mapped from lower layers with a specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unavailable(_) => "UNAVAILABLE",
            AppError::Http { code, .. } => code,
        }
    }

    fn http(status: StatusCode, code: &'static str, message: impl std::fmt::Display) -> Self {
        AppError::Http {
            status,
            code,
            message: message.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        AppError::http(StatusCode::BAD_GATEWAY, "LLM_ERROR", err)
    }
}

impl From<TutorError> for AppError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::Llm(e) => e.into(),
            TutorError::InvalidImage(msg) => AppError::BadRequest(format!("invalid image: {msg}")),
            e @ TutorError::Io { .. } => {
                AppError::http(StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e)
            }
            e @ TutorError::MissingPrompt(_) => {
                AppError::http(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", e)
            }
        }
    }
}

impl From<MedRagError> for AppError {
    fn from(err: MedRagError) -> Self {
        match err {
            MedRagError::Llm(e) => e.into(),
            e @ (MedRagError::Embedding(_) | MedRagError::MaxAttemptsReached { .. }) => {
                AppError::http(StatusCode::BAD_GATEWAY, "LLM_ERROR", e)
            }
            e @ MedRagError::Json(_) => AppError::http(StatusCode::BAD_GATEWAY, "LLM_ERROR", e),
            e @ MedRagError::Qdrant(_) => {
                AppError::http(StatusCode::BAD_GATEWAY, "VECTOR_DB_ERROR", e)
            }
            e @ (MedRagError::UnsupportedDocument(_)
            | MedRagError::OutsideDocumentsRoot(_)
            | MedRagError::InvalidConfig(_)) => {
                AppError::BadRequest(e.to_string())
            }
            e @ MedRagError::Io { .. } => {
                AppError::http(StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", e)
            }
            e @ (MedRagError::EnvParse { .. } | MedRagError::MissingPrompt(_)) => {
                AppError::http(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn llm_failures_are_bad_gateway() {
        let e: AppError = TutorError::Llm(AiLlmError::Timeout(Duration::from_secs(3))).into();
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(e.error_code(), "LLM_ERROR");
    }

    #[test]
    fn filesystem_failures_are_internal() {
        let e: AppError = TutorError::Io {
            path: "public/drawing.png".into(),
            source: std::io::Error::other("disk full"),
        }
        .into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error_code(), "IO_ERROR");
    }

    #[test]
    fn exhausted_retries_name_the_step() {
        let e: AppError = MedRagError::MaxAttemptsReached {
            what: "diagnosis",
            attempts: 4,
            last_error: "EOF".into(),
        }
        .into();
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);
        assert!(e.to_string().contains("diagnosis"));
    }

    #[test]
    fn out_of_root_documents_are_bad_requests() {
        let e: AppError = MedRagError::OutsideDocumentsRoot("../etc/passwd.txt".into()).into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(e.error_code(), "BAD_REQUEST");
    }
}
