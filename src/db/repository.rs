//! SQLite-backed student repository.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{Row, SqlitePool};

use super::{StoreError, StudentStore};
use crate::models::{Department, Gender, NewStudent, Section, StudentRecord};

const STUDENT_COLUMNS: &str = "id, name, roll, gender, department, section, skills, created_at";

/// SQLite primary result codes for a busy or locked database.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Database repository for student records.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentStore for Repository {
    async fn find_by_roll(&self, roll: &str) -> Result<Option<StudentRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE roll = ?"
        ))
        .bind(roll)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(student_from_row).transpose()
    }

    async fn create(&self, student: &NewStudent) -> Result<StudentRecord, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        // Stored with microsecond precision so text order is time order.
        let created_at = Utc::now().trunc_subsecs(6);
        let skills_json = serde_json::to_string(&student.skills)
            .map_err(|e| StoreError::Other(format!("Failed to encode skills: {}", e)))?;

        sqlx::query(
            "INSERT INTO students (id, name, roll, gender, department, section, skills, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&student.name)
        .bind(&student.roll)
        .bind(student.gender.as_str())
        .bind(student.department.as_str())
        .bind(student.section.as_str())
        .bind(&skills_json)
        .bind(format_timestamp(&created_at))
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateRoll(student.roll.clone())
            }
            _ => StoreError::from(err),
        })?;

        Ok(StudentRecord {
            id,
            name: student.name.clone(),
            roll: student.roll.clone(),
            gender: student.gender,
            department: student.department,
            section: student.section,
            skills: student.skills.clone(),
            created_at,
        })
    }

    async fn find_all_ordered_by_created_at_desc(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(student_from_row).collect()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::Schema(db.message().to_string())
            }
            sqlx::Error::Database(db) if is_contention(db.code().as_deref()) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Other(err.to_string()),
        }
    }
}

// Helper functions for row conversion

fn student_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StudentRecord, StoreError> {
    let gender: String = row.try_get("gender")?;
    let department: String = row.try_get("department")?;
    let section: String = row.try_get("section")?;
    let skills: String = row.try_get("skills")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(StudentRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        roll: row.try_get("roll")?,
        gender: Gender::from_str(&gender).ok_or_else(|| corrupt("gender", &gender))?,
        department: Department::from_str(&department)
            .ok_or_else(|| corrupt("department", &department))?,
        section: Section::from_str(&section).ok_or_else(|| corrupt("section", &section))?,
        skills: serde_json::from_str(&skills).map_err(|_| corrupt("skills", &skills))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| corrupt("created_at", &created_at))?,
    })
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Other(format!("Unreadable {} value in store: {:?}", column, value))
}

fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Extended result codes carry the primary code in their low byte.
fn is_contention(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}
