//! Error handling - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use blogicum_core::error::{DomainError, RepoError};
use blogicum_core::pagination::PageError;
use blogicum_core::ports::AuthError;
use blogicum_shared::response::NON_FIELD_ERRORS;
use blogicum_shared::{ErrorResponse, FieldErrors};

const PAGE_NOT_FOUND: &str = "Page not found";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Application-level error type that converts to RFC 7807 responses.
///
/// Only three outcomes reach clients besides `500`: hidden or missing
/// resources are `404`, ownership failures `403` and rejected forms `422`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {}", .0.summary())]
    Validation(FieldErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::NotFound(PAGE_NOT_FOUND.to_string())
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(FieldErrors::single(field, message))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Validation(errors) => ErrorResponse::validation_failed(errors.clone()),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "Internal error");
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("No {entity_type} matches {key}"))
            }
            DomainError::Validation(msg) => AppError::field(NON_FIELD_ERRORS, msg),
            DomainError::Forbidden(kind) => {
                AppError::Forbidden(format!("Only the author may change this {kind}"))
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Attribute a violated database constraint to the form field behind it.
fn constraint_errors(constraint: &str) -> FieldErrors {
    let (field, message) = if constraint.contains("users_username_key") {
        ("username", "A user with that username already exists.")
    } else if constraint.contains("categories_slug_key") {
        ("slug", "Category with this slug already exists.")
    } else if constraint.contains("posts_category_id_fkey") {
        ("category", INVALID_CHOICE)
    } else if constraint.contains("posts_location_id_fkey") {
        ("location", INVALID_CHOICE)
    } else {
        (NON_FIELD_ERRORS, "The submitted data conflicts with existing records.")
    };
    FieldErrors::single(field, message)
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::not_found(),
            RepoError::Constraint(constraint) => {
                tracing::debug!(%constraint, "Constraint violation");
                AppError::Validation(constraint_errors(&constraint))
            }
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::field(
                NON_FIELD_ERRORS,
                "Please enter a correct username and password.",
            ),
            AuthError::HashingError(msg) => AppError::Internal(msg),
            AuthError::TokenExpired | AuthError::InvalidToken(_) | AuthError::MissingAuth => {
                AppError::not_found()
            }
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<PageError> for AppError {
    fn from(_: PageError) -> Self {
        AppError::not_found()
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
