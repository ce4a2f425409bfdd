use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use axum_helpers::errors::describe_validation_errors;
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ShareItError {
    /// Missing resource, or one the caller may not see
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShareItError {
    pub fn user_not_found(id: i64) -> Self {
        Self::NotFound(format!("User {} not found", id))
    }

    pub fn item_not_found(id: i64) -> Self {
        Self::NotFound(format!("Item {} not found", id))
    }

    pub fn booking_not_found(id: i64) -> Self {
        Self::NotFound(format!("Booking {} not found", id))
    }

    pub fn request_not_found(id: i64) -> Self {
        Self::NotFound(format!("Item request {} not found", id))
    }
}

pub type ShareItResult<T> = Result<T, ShareItError>;

impl From<DbErr> for ShareItError {
    fn from(err: DbErr) -> Self {
        ShareItError::Internal(format!("Database error: {}", err))
    }
}

impl From<ValidationErrors> for ShareItError {
    fn from(err: ValidationErrors) -> Self {
        ShareItError::Validation(describe_validation_errors(&err))
    }
}

/// Convert ShareItError to AppError for standardized error responses
impl From<ShareItError> for AppError {
    fn from(err: ShareItError) -> Self {
        match err {
            ShareItError::NotFound(msg) => AppError::NotFound(msg),
            ShareItError::Validation(msg) => AppError::BadRequest(msg),
            err @ ShareItError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            ShareItError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ShareItError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
