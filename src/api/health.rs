//! Health check and unmatched-route endpoints.

use axum::http::{Method, Uri};
use chrono::{SecondsFormat, Utc};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::HealthStatus;

/// GET / - Liveness check.
pub async fn health_check() -> ApiResult<HealthStatus> {
    success(HealthStatus {
        message: "Student Registration API is running!".to_string(),
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Any method/path pair without a handler.
pub async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} {} not found", method, uri.path()))
}
