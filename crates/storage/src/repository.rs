use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{AttemptId, CourseId, LessonId};
use course_core::{LearnerProgress, Score};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Append-only record written each time a lesson is marked complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonCompletionRecord {
    /// Storage-assigned row id; `None` until appended.
    pub id: Option<i64>,
    pub attempt_id: AttemptId,
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    /// Lesson the learner lands on after completing `lesson_id`.
    pub resume_lesson_id: LessonId,
    pub score: Score,
    pub completed_at: DateTime<Utc>,
}

/// Latest full state of one attempt. One row per attempt, overwritten on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub attempt_id: AttemptId,
    pub course_id: CourseId,
    pub progress: LearnerProgress,
    pub saved_at: DateTime<Utc>,
}

/// Repository contract for lesson completions and progress snapshots.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a completion record and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_completion(&self, record: &LessonCompletionRecord)
    -> Result<i64, StorageError>;

    /// Completion records for an attempt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if records cannot be read.
    async fn list_completions(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<LessonCompletionRecord>, StorageError>;

    /// Insert or replace the snapshot for `snapshot.attempt_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    /// Fetch the snapshot of one attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the attempt has no snapshot.
    async fn load_snapshot(&self, attempt_id: AttemptId) -> Result<ProgressSnapshot, StorageError>;

    /// Most recently saved snapshot for a course, across attempts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if snapshots cannot be read.
    async fn latest_snapshot(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<ProgressSnapshot>, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    completions: Vec<LessonCompletionRecord>,
    // Save sequence breaks ties between snapshots saved at the same instant.
    snapshots: HashMap<AttemptId, (u64, ProgressSnapshot)>,
    next_seq: u64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn append_completion(
        &self,
        record: &LessonCompletionRecord,
    ) -> Result<i64, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.completions.len() + 1)
            .map_err(|_| StorageError::Serialization("completion id overflow".into()))?;
        let mut stored = record.clone();
        stored.id = Some(id);
        guard.completions.push(stored);
        Ok(id)
    }

    async fn list_completions(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<LessonCompletionRecord>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .completions
            .iter()
            .filter(|r| r.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.next_seq += 1;
        let seq = guard.next_seq;
        guard
            .snapshots
            .insert(snapshot.attempt_id, (seq, snapshot.clone()));
        Ok(())
    }

    async fn load_snapshot(&self, attempt_id: AttemptId) -> Result<ProgressSnapshot, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .snapshots
            .get(&attempt_id)
            .map(|(_, snapshot)| snapshot.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn latest_snapshot(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<ProgressSnapshot>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .snapshots
            .values()
            .filter(|(_, s)| &s.course_id == course_id)
            .max_by_key(|(seq, s)| (s.saved_at, *seq))
            .map(|(_, s)| s.clone()))
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
