//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::registry::RegistryError;
use crate::views;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {size} bytes (max: {max_size} bytes)")]
    PayloadTooLarge { size: u64, max_size: u64 },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Registry(err) => match err {
                RegistryError::InvalidName { .. }
                | RegistryError::InvalidExtension { .. }
                | RegistryError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,
                RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RegistryError::DeleteError { .. }
                | RegistryError::WriteError { .. }
                | RegistryError::StreamError { .. }
                | RegistryError::DirectoryRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::IoError(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Registry(err) if err.is_validation() => {
                tracing::warn!("Rejected request: {}", err);
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Rejected request: {}", msg);
            }
            AppError::PayloadTooLarge { .. } => tracing::warn!("{}", self),
            _ => tracing::error!("Request failed: {:?}", self),
        }

        views::error_page(status)
    }
}
