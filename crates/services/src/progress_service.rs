use std::sync::Arc;

use course_core::model::{AttemptId, CourseContent};
use course_core::{GateOptions, ProgressionEngine, Transition};
use storage::repository::{LessonCompletionRecord, ProgressRepository, ProgressSnapshot, Storage};

use crate::Clock;
use crate::error::ProgressServiceError;

/// Outcome of completing the current lesson through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonCompletionResult {
    pub transition: Transition,
    /// The appended record, present only when `transition` is `Applied`.
    pub record: Option<LessonCompletionRecord>,
    pub lessons_complete: bool,
}

/// Starts and resumes attempts, and persists progress around engine
/// transitions.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    options: GateOptions,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, options: GateOptions, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            options,
            progress,
        }
    }

    /// Build a service backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Sqlite` if the database cannot be opened
    /// or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        options: GateOptions,
    ) -> Result<Self, ProgressServiceError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(clock, options, storage.progress))
    }

    #[must_use]
    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    /// Begin a fresh attempt and persist its empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be saved.
    pub async fn start(
        &self,
        content: Arc<CourseContent>,
    ) -> Result<ProgressionEngine, ProgressServiceError> {
        let engine = ProgressionEngine::new(content, self.options);
        tracing::info!(
            course = %engine.content().id(),
            attempt = %engine.attempt_id(),
            "started attempt"
        );
        self.save_snapshot(&engine).await?;
        Ok(engine)
    }

    /// Pick up the most recent attempt at this course, or start a new one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on storage failures.
    pub async fn resume(
        &self,
        content: Arc<CourseContent>,
    ) -> Result<ProgressionEngine, ProgressServiceError> {
        match self.progress.latest_snapshot(content.id()).await? {
            Some(snapshot) => Ok(self.rebuild(content, snapshot)),
            None => self.start(content).await,
        }
    }

    /// Resume one specific attempt.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` (`NotFound` when the attempt has
    /// no snapshot) or `CourseMismatch` when it belongs to another course.
    pub async fn resume_attempt(
        &self,
        content: Arc<CourseContent>,
        attempt_id: AttemptId,
    ) -> Result<ProgressionEngine, ProgressServiceError> {
        let snapshot = self.progress.load_snapshot(attempt_id).await?;
        if &snapshot.course_id != content.id() {
            return Err(ProgressServiceError::CourseMismatch {
                attempt: attempt_id,
                expected: content.id().clone(),
                found: snapshot.course_id,
            });
        }
        Ok(self.rebuild(content, snapshot))
    }

    fn rebuild(&self, content: Arc<CourseContent>, snapshot: ProgressSnapshot) -> ProgressionEngine {
        tracing::info!(
            course = %snapshot.course_id,
            attempt = %snapshot.attempt_id,
            saved_at = %snapshot.saved_at,
            "resuming attempt"
        );
        ProgressionEngine::resume(content, self.options, snapshot.attempt_id, snapshot.progress)
    }

    /// Complete the current lesson and, when that changes state, append a
    /// completion record and save a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if persistence fails. The
    /// engine keeps the in-memory transition either way.
    pub async fn complete_current_lesson(
        &self,
        engine: &mut ProgressionEngine,
    ) -> Result<LessonCompletionResult, ProgressServiceError> {
        let lesson_id = engine.current_lesson().id().clone();
        let transition = engine.complete_current_lesson();

        let record = if transition.is_applied() {
            let mut record = LessonCompletionRecord {
                id: None,
                attempt_id: engine.attempt_id(),
                course_id: engine.content().id().clone(),
                resume_lesson_id: engine.current_lesson().id().clone(),
                score: engine.lesson_score(lesson_id.as_str()).unwrap_or_default(),
                lesson_id,
                completed_at: self.clock.now(),
            };
            let id = self.progress.append_completion(&record).await?;
            record.id = Some(id);
            tracing::info!(
                attempt = %record.attempt_id,
                lesson = %record.lesson_id,
                score = record.score.score,
                total = record.score.total,
                "lesson completion recorded"
            );
            self.save_snapshot(engine).await?;
            Some(record)
        } else {
            None
        };

        Ok(LessonCompletionResult {
            transition,
            record,
            lessons_complete: engine.lessons_complete(),
        })
    }

    /// Persist the engine's current state as its attempt's snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the snapshot cannot be saved.
    pub async fn save_snapshot(&self, engine: &ProgressionEngine) -> Result<(), ProgressServiceError> {
        let snapshot = ProgressSnapshot {
            attempt_id: engine.attempt_id(),
            course_id: engine.content().id().clone(),
            progress: engine.state().clone(),
            saved_at: self.clock.now(),
        };
        self.progress.save_snapshot(&snapshot).await?;
        tracing::debug!(attempt = %snapshot.attempt_id, "snapshot saved");
        Ok(())
    }

    /// Completion records of an attempt, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on read failures.
    pub async fn completion_history(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<LessonCompletionRecord>, ProgressServiceError> {
        Ok(self.progress.list_completions(attempt_id).await?)
    }
}
