//! Error handling module for the registration backend.
//!
//! Maps domain failures to HTTP status codes and the `{ "error": ... }` body
//! the registration form reads.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::registration::{RegistrationFailure, ValidationFailure};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const MISSING_FIELDS: &str = "MISSING_FIELDS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DUPLICATE_ROLL: &str = "DUPLICATE_ROLL";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Generic message for server-side failures outside a route context.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// One or more required fields absent or blank
    MissingFields(String),
    /// Enum value outside its set, or a schema rejection from storage
    Validation(String),
    /// Roll number already registered
    DuplicateRoll(String),
    /// Request body could not be read
    BadRequest(String),
    /// No route matched
    NotFound(String),
    /// Store unreachable or timed out
    StorageUnavailable(String),
    /// Anything not anticipated
    Unexpected(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateRoll(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingFields(_) => codes::MISSING_FIELDS,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::DuplicateRoll(_) => codes::DUPLICATE_ROLL,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::StorageUnavailable(_) => codes::STORAGE_UNAVAILABLE,
            AppError::Unexpected(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message. For server errors this is internal detail.
    pub fn message(&self) -> &str {
        match self {
            AppError::MissingFields(msg)
            | AppError::Validation(msg)
            | AppError::DuplicateRoll(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::StorageUnavailable(msg)
            | AppError::Unexpected(msg) => msg,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Attach the client-facing message used if this turns out to be a 500.
    pub fn in_context(self, context: &'static str) -> AppErrorWithContext {
        AppErrorWithContext {
            error: self,
            context,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<RegistrationFailure> for AppError {
    fn from(failure: RegistrationFailure) -> Self {
        let message = failure.to_string();
        match failure {
            RegistrationFailure::Validation(ValidationFailure::MissingFields) => {
                AppError::MissingFields(message)
            }
            RegistrationFailure::Validation(_) => AppError::Validation(message),
            RegistrationFailure::DuplicateRoll(_) => AppError::DuplicateRoll(message),
            RegistrationFailure::StorageUnavailable(_) => AppError::StorageUnavailable(message),
            RegistrationFailure::Unexpected(_) => AppError::Unexpected(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.in_context(INTERNAL_ERROR_MESSAGE).into_response()
    }
}

/// Wrapper type for errors that carry the route's generic 500 message.
#[derive(Debug)]
pub struct AppErrorWithContext {
    pub error: AppError,
    pub context: &'static str,
}

impl IntoResponse for AppErrorWithContext {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let message = if self.error.is_server_error() {
            tracing::error!(context = self.context, "{}", self.error);
            self.context.to_string()
        } else {
            tracing::debug!("Rejected request: {}", self.error);
            self.error.message().to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
