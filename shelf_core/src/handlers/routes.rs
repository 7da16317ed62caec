//! Route table for the document shelf

use axum::{
    routing::{get, post},
    Router,
};

use super::{documents, health};
use crate::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list_documents))
        .route("/download/:name", get(documents::download_document))
        .route("/delete/:name", post(documents::delete_document))
        .route("/upload", post(documents::upload_document))
        .route("/health", get(health::handle_health))
        .fallback(documents::not_found)
}
