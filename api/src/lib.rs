//! HTTP surface of the tutor and the diagnosis pipeline.

use std::{env, sync::Arc};

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};
use crate::routes::{
    artifacts::{save_diagram_route::save_diagram_route, save_image_route::save_image_route},
    diagnosis::{diagnose_route::diagnose_route, index_route::build_index_route},
    health_route::health_route,
    test_route::test_route,
    tutor::{generate_route::generate_route, reset_session_route::reset_session_route},
};

const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
/// Canvas exports arrive base64-encoded inside JSON.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate", post(generate_route))
        .route("/api/session/reset", post(reset_session_route))
        .route("/api/save_diagram", post(save_diagram_route))
        .route("/api/save_image", post(save_image_route))
        .route("/api/diagnose", post(diagnose_route))
        .route("/api/diagnosis/index", post(build_index_route))
        .route("/test", get(test_route))
        .route("/health", get(health_route))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let addr = env::var("API_ADDRESS")
        .ok()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for shutdown signal; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
