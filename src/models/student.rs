//! Student model matching the registration form payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skills offered as checkboxes by the registration form. Not enforced.
pub const SUGGESTED_SKILLS: [&str; 8] = [
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "React",
    "Node.js",
    "HTML/CSS",
    "SQL",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

/// Academic department. Wire names contain spaces, so serde goes through the
/// string form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Department {
    #[serde(rename = "Computer Science")]
    ComputerScience,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
    Electronics,
    Mechanical,
    Civil,
    #[allow(clippy::upper_case_acronyms)]
    AIDS,
    #[allow(clippy::upper_case_acronyms)]
    CET,
}

impl Department {
    pub const ALL: [Department; 7] = [
        Department::ComputerScience,
        Department::InformationTechnology,
        Department::Electronics,
        Department::Mechanical,
        Department::Civil,
        Department::AIDS,
        Department::CET,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::ComputerScience => "Computer Science",
            Department::InformationTechnology => "Information Technology",
            Department::Electronics => "Electronics",
            Department::Mechanical => "Mechanical",
            Department::Civil => "Civil",
            Department::AIDS => "AIDS",
            Department::CET => "CET",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Section {
    A,
    B,
    C,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::A,
        Section::B,
        Section::C,
        Section::One,
        Section::Two,
        Section::Three,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::A => "A",
            Section::B => "B",
            Section::C => "C",
            Section::One => "1",
            Section::Two => "2",
            Section::Three => "3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sec| sec.as_str() == s)
    }
}

/// A persisted student registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub roll: String,
    pub gender: Gender,
    pub department: Department,
    pub section: Section,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated submission, ready to be handed to storage.
///
/// Storage assigns `id` and `created_at` on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll: String,
    pub gender: Gender,
    pub department: Department,
    pub section: Section,
    pub skills: Vec<String>,
}

/// Request body for `POST /students`, exactly as the form sends it.
///
/// Every field is optional here so that absence is reported by the validator
/// rather than by the JSON extractor. `skills` is kept as raw JSON since a
/// malformed value is coerced, not rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterStudentRequest {
    pub name: Option<String>,
    pub roll: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub section: Option<String>,
    pub skills: Option<serde_json::Value>,
}

/// Response body for a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterStudentResponse {
    pub message: String,
    pub student: StudentRecord,
}

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub message: String,
    pub status: String,
    pub timestamp: String,
}
