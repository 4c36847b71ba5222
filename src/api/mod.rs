//! REST API module.
//!
//! Contains the routes and handlers the registration form talks to.

mod health;
mod students;

pub use health::*;
pub use students::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithContext};

/// Success response carrying a JSON body and its status code.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub status: StatusCode,
    pub body: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithContext>;

/// Create a 200 response.
pub fn success<T: Serialize>(body: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::OK,
        body,
    })
}

/// Create a 201 response.
pub fn created<T: Serialize>(body: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::CREATED,
        body,
    })
}

/// Create an error response; `context` is what the client sees on a 500.
pub fn error<T: Serialize>(err: impl Into<AppError>, context: &'static str) -> ApiResult<T> {
    Err(err.into().in_context(context))
}
