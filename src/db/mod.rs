//! Storage collaborator for student records.
//!
//! The registration service only sees the [`StudentStore`] trait; SQLite is the
//! shipped implementation and the final authority on roll uniqueness.

mod repository;

pub use repository::*;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::models::{NewStudent, StudentRecord};

/// Errors reported by a [`StudentStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store's uniqueness constraint on `roll` rejected the write.
    #[error("Roll number {0} is already registered")]
    DuplicateRoll(String),

    /// The store's own schema rejected the record.
    #[error("Schema violation: {0}")]
    Schema(String),

    /// Anything else the store reported.
    #[error("Store error: {0}")]
    Other(String),
}

/// Persistence operations the registration service depends on.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Look up the record registered under `roll`, if any.
    async fn find_by_roll(&self, roll: &str) -> Result<Option<StudentRecord>, StoreError>;

    /// Persist a new record, assigning its `id` and `created_at`.
    ///
    /// Must reject a second record with the same `roll` with
    /// [`StoreError::DuplicateRoll`] even when callers race.
    async fn create(&self, student: &NewStudent) -> Result<StudentRecord, StoreError>;

    /// All records, most recently created first.
    async fn find_all_ordered_by_created_at_desc(&self) -> Result<Vec<StudentRecord>, StoreError>;
}

/// Initialize the database connection pool and run migrations.
///
/// A failure here means the service must not start.
pub async fn init_database(db_path: &Path, timeout: Duration) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(name) > 0),
            roll TEXT NOT NULL UNIQUE CHECK (length(roll) > 0),
            gender TEXT NOT NULL
                CHECK (gender IN ('Male', 'Female', 'Other')),
            department TEXT NOT NULL
                CHECK (department IN ('Computer Science', 'Information Technology',
                    'Electronics', 'Mechanical', 'Civil', 'AIDS', 'CET')),
            section TEXT NOT NULL
                CHECK (section IN ('A', 'B', 'C', '1', '2', '3')),
            skills TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_students_created_at ON students(created_at);")
        .execute(pool)
        .await?;

    Ok(())
}
