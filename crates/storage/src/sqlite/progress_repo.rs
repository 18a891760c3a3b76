use course_core::model::{AttemptId, CourseId};

use super::SqliteRepository;
use super::mapping::{count_to_i64, map_completion_row, map_snapshot_row, ser};
use crate::repository::{
    LessonCompletionRecord, ProgressRepository, ProgressSnapshot, StorageError,
};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn append_completion(
        &self,
        record: &LessonCompletionRecord,
    ) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO lesson_completions (
                    attempt_id, course_id, lesson_id, resume_lesson_id,
                    score, total, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(record.attempt_id.to_string())
        .bind(record.course_id.as_str())
        .bind(record.lesson_id.as_str())
        .bind(record.resume_lesson_id.as_str())
        .bind(count_to_i64("score", record.score.score)?)
        .bind(count_to_i64("total", record.score.total)?)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn list_completions(
        &self,
        attempt_id: AttemptId,
    ) -> Result<Vec<LessonCompletionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, attempt_id, course_id, lesson_id, resume_lesson_id,
                    score, total, completed_at
                FROM lesson_completions
                WHERE attempt_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(attempt_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_completion_row).collect()
    }

    async fn save_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let progress = serde_json::to_string(&snapshot.progress).map_err(ser)?;

        // REPLACE deletes and reinserts, so the rowid also orders saves.
        sqlx::query(
            r"
                INSERT OR REPLACE INTO progress_snapshots (
                    attempt_id, course_id, progress, saved_at
                )
                VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(snapshot.attempt_id.to_string())
        .bind(snapshot.course_id.as_str())
        .bind(progress)
        .bind(snapshot.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load_snapshot(&self, attempt_id: AttemptId) -> Result<ProgressSnapshot, StorageError> {
        let row = sqlx::query(
            r"
                SELECT attempt_id, course_id, progress, saved_at
                FROM progress_snapshots
                WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_snapshot_row(&row)
    }

    async fn latest_snapshot(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<ProgressSnapshot>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT attempt_id, course_id, progress, saved_at
                FROM progress_snapshots
                WHERE course_id = ?1
                ORDER BY saved_at DESC, rowid DESC
                LIMIT 1
            ",
        )
        .bind(course_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_snapshot_row).transpose()
    }
}
