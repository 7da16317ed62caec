//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let upload_dir = state.registry.config().upload_dir.display().to_string();

    match state.registry.scan_documents().await {
        Ok(documents) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "version": state.version,
                "timestamp": chrono::Utc::now().timestamp(),
                "upload_dir": upload_dir,
                "documents": documents.len(),
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "version": state.version,
                    "timestamp": chrono::Utc::now().timestamp(),
                    "upload_dir": upload_dir,
                    "error": e.to_string(),
                })),
            )
        }
    }
}
