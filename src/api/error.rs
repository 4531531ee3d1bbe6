use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::CatalogError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    ValidationError(String),

    StorageError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

/// A non-positive or unknown id is a missing resource to the client;
/// rule violations are bad requests; backend faults are server errors.
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::FilmNotFound(_)
            | CatalogError::UserNotFound(_)
            | CatalogError::RatingNotFound(_)
            | CatalogError::GenreNotFound(_)
            | CatalogError::InvalidReference(_) => Self::NotFound(err.to_string()),
            CatalogError::SelfFriendship(_) | CatalogError::Validation(_) => {
                Self::ValidationError(err.to_string())
            }
            CatalogError::Storage(msg) => Self::StorageError(msg),
        }
    }
}
