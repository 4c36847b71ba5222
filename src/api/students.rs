//! Student API endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::{created, error, success, ApiResult};
use crate::models::{RegisterStudentRequest, RegisterStudentResponse, StudentRecord};
use crate::AppState;

const REGISTER_FAILED: &str = "Server error during registration";
const LIST_FAILED: &str = "Fetch failed";

/// POST /students - Register a new student.
pub async fn register_student(
    State(state): State<AppState>,
    payload: Result<Json<RegisterStudentRequest>, JsonRejection>,
) -> ApiResult<RegisterStudentResponse> {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return error(rejection, REGISTER_FAILED),
    };

    match state.registration.register(&request).await {
        Ok(student) => created(RegisterStudentResponse {
            message: "Student registered successfully".to_string(),
            student,
        }),
        Err(e) => error(e, REGISTER_FAILED),
    }
}

/// GET /students - List all students, newest first.
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Vec<StudentRecord>> {
    match state.registration.list_all().await {
        Ok(students) => success(students),
        Err(e) => error(e, LIST_FAILED),
    }
}
