//! Validation and normalization of raw registration submissions.

use thiserror::Error;

use crate::models::{Department, Gender, NewStudent, RegisterStudentRequest, Section};

/// Fields a submission must carry, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "roll", "gender", "department", "section"];

/// Why a submission was rejected before reaching storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationFailure {
    /// At least one required field is absent or blank. The message always
    /// lists the full required set.
    #[error("Missing required fields: {}", REQUIRED_FIELDS.join(", "))]
    MissingFields,

    /// An enumerated field holds a value outside its allowed set.
    #[error("Validation error: `{value}` is not a valid enum value for path `{field}`.")]
    InvalidEnum { field: &'static str, value: String },

    /// Storage rejected the record on schema grounds.
    #[error("Validation error: {0}")]
    Schema(String),
}

/// Check a raw submission and produce the record to persist.
///
/// Checks run in a fixed order: presence of every required field, then
/// gender, department and section membership. `name`, `roll`, `department`
/// and `section` are trimmed; `gender` is matched as sent.
pub fn validate(candidate: &RegisterStudentRequest) -> Result<NewStudent, ValidationFailure> {
    let name = required(&candidate.name)?;
    let roll = required(&candidate.roll)?;
    let gender_raw = candidate
        .gender
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .ok_or(ValidationFailure::MissingFields)?;
    let department = required(&candidate.department)?;
    let section = required(&candidate.section)?;

    let gender = Gender::from_str(gender_raw).ok_or_else(|| invalid("gender", gender_raw))?;
    let department =
        Department::from_str(department).ok_or_else(|| invalid("department", department))?;
    let section = Section::from_str(section).ok_or_else(|| invalid("section", section))?;

    Ok(NewStudent {
        name: name.to_string(),
        roll: roll.to_string(),
        gender,
        department,
        section,
        skills: normalize_skills(candidate.skills.as_ref()),
    })
}

/// Coerce the submitted skills into a list of strings.
///
/// Anything other than an array made only of strings is treated as absent.
/// Duplicates are kept.
pub fn normalize_skills(skills: Option<&serde_json::Value>) -> Vec<String> {
    let Some(serde_json::Value::Array(items)) = skills else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

fn required(field: &Option<String>) -> Result<&str, ValidationFailure> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationFailure::MissingFields),
    }
}

fn invalid(field: &'static str, value: &str) -> ValidationFailure {
    ValidationFailure::InvalidEnum {
        field,
        value: value.to_string(),
    }
}
