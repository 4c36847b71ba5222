//! Data models for the student registration service.
//!
//! Field names match the JSON the registration form sends and expects back.

mod student;

pub use student::*;
