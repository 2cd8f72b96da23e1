use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Event with ID '{0}' not found")]
    NotFound(String),

    #[error("Event with ID '{0}' already exists")]
    Duplicate(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => {
                AppError::NotFound(format!("Event with ID '{}' not found", id))
            }
            CatalogError::Duplicate(id) => {
                AppError::Conflict(format!("Event with ID '{}' already exists", id))
            }
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Database(err) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
