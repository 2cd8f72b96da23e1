use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Errors produced by the registration domain.
///
/// Message strings are complete sentences; the HTTP layer forwards them
/// verbatim in the standard error body.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Capacity(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Convert RegistrationError to AppError for standardized error responses
impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(msg) => AppError::BadRequest(msg),
            RegistrationError::Duplicate(msg) => AppError::Conflict(msg),
            RegistrationError::NotFound(msg) => AppError::NotFound(msg),
            RegistrationError::Capacity(msg) => AppError::Conflict(msg),
            RegistrationError::Database(err) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
