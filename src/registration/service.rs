//! Registration service: validate, check for a duplicate roll, persist.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::validator::{validate, ValidationFailure};
use crate::db::{StoreError, StudentStore};
use crate::models::{RegisterStudentRequest, StudentRecord, SUGGESTED_SKILLS};

/// Why a registration or listing did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationFailure {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Student with roll number '{0}' already exists")]
    DuplicateRoll(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<StoreError> for RegistrationFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => RegistrationFailure::StorageUnavailable(msg),
            StoreError::DuplicateRoll(roll) => RegistrationFailure::DuplicateRoll(roll),
            StoreError::Schema(msg) => ValidationFailure::Schema(msg).into(),
            StoreError::Other(msg) => RegistrationFailure::Unexpected(msg),
        }
    }
}

/// Orchestrates the write path against an injected store.
///
/// The duplicate lookup before insert is only a fast path: two concurrent
/// submissions with the same roll can both pass it. The store's uniqueness
/// constraint decides, and its rejection is reported as
/// [`RegistrationFailure::DuplicateRoll`] as well.
pub struct RegistrationService {
    store: Arc<dyn StudentStore>,
    timeout: Duration,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn StudentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Register a student from a raw submission.
    pub async fn register(
        &self,
        candidate: &RegisterStudentRequest,
    ) -> Result<StudentRecord, RegistrationFailure> {
        let student = validate(candidate)?;

        tracing::debug!(
            name = %student.name,
            roll = %student.roll,
            gender = student.gender.as_str(),
            department = student.department.as_str(),
            section = student.section.as_str(),
            skills = ?student.skills,
            "Received registration"
        );
        for skill in student
            .skills
            .iter()
            .filter(|s| !SUGGESTED_SKILLS.contains(&s.as_str()))
        {
            tracing::debug!(skill = %skill, "Skill outside the suggested vocabulary");
        }

        if self
            .bounded("find_by_roll", self.store.find_by_roll(&student.roll))
            .await?
            .is_some()
        {
            return Err(RegistrationFailure::DuplicateRoll(student.roll));
        }

        let record = self.bounded("create", self.store.create(&student)).await?;

        tracing::info!(id = %record.id, roll = %record.roll, "Student registered");
        Ok(record)
    }

    /// All registered students, most recent first.
    pub async fn list_all(&self) -> Result<Vec<StudentRecord>, RegistrationFailure> {
        self.bounded("find_all", self.store.find_all_ordered_by_created_at_desc())
            .await
    }

    /// Await a store call, turning an elapsed timeout into unavailability.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, RegistrationFailure> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(RegistrationFailure::from),
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "Store call timed out");
                Err(RegistrationFailure::StorageUnavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::models::NewStudent;

    /// In-memory store whose behaviour can be degraded per test.
    #[derive(Default)]
    struct StubStore {
        records: Mutex<Vec<StudentRecord>>,
        /// Pretend the lookup never sees existing rows, as in a lost race.
        blind_lookup: bool,
        unavailable: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl StudentStore for StubStore {
        async fn find_by_roll(&self, roll: &str) -> Result<Option<StudentRecord>, StoreError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.unavailable {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            if self.blind_lookup {
                return Ok(None);
            }
            let records = self.records.lock().unwrap();
            Ok(records.iter().find(|r| r.roll == roll).cloned())
        }

        async fn create(&self, student: &NewStudent) -> Result<StudentRecord, StoreError> {
            let mut records = self.records.lock().unwrap();
            if records.iter().any(|r| r.roll == student.roll) {
                return Err(StoreError::DuplicateRoll(student.roll.clone()));
            }
            let record = StudentRecord {
                id: format!("id-{}", records.len() + 1),
                name: student.name.clone(),
                roll: student.roll.clone(),
                gender: student.gender,
                department: student.department,
                section: student.section,
                skills: student.skills.clone(),
                created_at: Utc::now(),
            };
            records.push(record.clone());
            Ok(record)
        }

        async fn find_all_ordered_by_created_at_desc(
            &self,
        ) -> Result<Vec<StudentRecord>, StoreError> {
            if self.unavailable {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(self.records.lock().unwrap().iter().rev().cloned().collect())
        }
    }

    fn service(store: Arc<StubStore>) -> RegistrationService {
        RegistrationService::new(store, Duration::from_secs(5))
    }

    fn submission(roll: &str) -> RegisterStudentRequest {
        serde_json::from_value(json!({
            "name": "Bob",
            "roll": roll,
            "gender": "Male",
            "department": "Civil",
            "section": "A",
            "skills": ["SQL"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_persists_normalized_record() {
        let store = Arc::new(StubStore::default());
        let service = service(store.clone());

        let mut candidate = submission(" R100 ");
        candidate.name = Some("  Alice  ".to_string());

        let record = service.register(&candidate).await.unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.roll, "R100");
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_persists_nothing() {
        let store = Arc::new(StubStore::default());
        let service = service(store.clone());

        let mut candidate = submission("R1");
        candidate.section = None;
        assert_eq!(
            service.register(&candidate).await,
            Err(RegistrationFailure::Validation(
                ValidationFailure::MissingFields
            ))
        );

        let mut candidate = submission("R1");
        candidate.gender = Some("Robot".to_string());
        assert!(matches!(
            service.register(&candidate).await,
            Err(RegistrationFailure::Validation(ValidationFailure::InvalidEnum { .. }))
        ));

        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_registration_with_same_roll_is_duplicate() {
        let store = Arc::new(StubStore::default());
        let service = service(store.clone());

        service.register(&submission("R100")).await.unwrap();

        let mut again = submission("R100");
        again.name = Some("Someone Else".to_string());
        let err = service.register(&again).await.unwrap_err();
        assert_eq!(err, RegistrationFailure::DuplicateRoll("R100".to_string()));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_constraint_catches_lost_race() {
        let store = Arc::new(StubStore {
            blind_lookup: true,
            ..Default::default()
        });
        let service = service(store.clone());

        service.register(&submission("R5")).await.unwrap();
        assert_eq!(
            service.register(&submission("R5")).await,
            Err(RegistrationFailure::DuplicateRoll("R5".to_string()))
        );
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_unavailable() {
        let store = Arc::new(StubStore {
            unavailable: true,
            ..Default::default()
        });
        let service = service(store);

        assert!(matches!(
            service.register(&submission("R1")).await,
            Err(RegistrationFailure::StorageUnavailable(_))
        ));
        assert!(matches!(
            service.list_all().await,
            Err(RegistrationFailure::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = Arc::new(StubStore {
            delay: Some(Duration::from_secs(2)),
            ..Default::default()
        });
        let service = RegistrationService::new(store.clone(), Duration::from_millis(50));

        assert!(matches!(
            service.register(&submission("R1")).await,
            Err(RegistrationFailure::StorageUnavailable(_))
        ));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_is_stable_without_writes() {
        let store = Arc::new(StubStore::default());
        let service = service(store);

        for roll in ["R1", "R2", "R3"] {
            service.register(&submission(roll)).await.unwrap();
        }

        let first = service.list_all().await.unwrap();
        let second = service.list_all().await.unwrap();
        assert_eq!(first, second);
        let rolls: Vec<&str> = first.iter().map(|s| s.roll.as_str()).collect();
        assert_eq!(rolls, vec!["R3", "R2", "R1"]);
    }

    #[test]
    fn test_store_errors_map_to_failures() {
        assert_eq!(
            RegistrationFailure::from(StoreError::Schema("bad".to_string())),
            RegistrationFailure::Validation(ValidationFailure::Schema("bad".to_string()))
        );
        assert_eq!(
            RegistrationFailure::from(StoreError::Other("boom".to_string())),
            RegistrationFailure::Unexpected("boom".to_string())
        );
    }
}
