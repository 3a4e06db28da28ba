//! Library maintenance routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::error::AppError;
use super::AppContext;

pub fn library_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_check))
        .route("/library/rescan", post(rescan))
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start a background rescan. The new catalog replaces the current one
/// when the scan finishes.
async fn rescan(State(ctx): State<AppContext>) -> Result<impl IntoResponse, AppError> {
    ctx.library.start_rescan()?;
    tracing::info!(root = %ctx.library.root().display(), "Rescan requested");
    Ok((StatusCode::ACCEPTED, Json(json!({"status": "scanning"}))))
}
