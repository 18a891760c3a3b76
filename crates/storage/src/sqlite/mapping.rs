use course_core::Score;
use course_core::model::{AttemptId, CourseId, LessonId};
use sqlx::Row;

use crate::repository::{LessonCompletionRecord, ProgressSnapshot, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn count_to_i64(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn count_from_i64(field: &'static str, v: i64) -> Result<usize, StorageError> {
    usize::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn attempt_id_from_str(s: &str) -> Result<AttemptId, StorageError> {
    s.parse().map_err(ser)
}

pub(crate) fn map_completion_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LessonCompletionRecord, StorageError> {
    let attempt: String = row.try_get("attempt_id").map_err(ser)?;
    let score = Score::new(
        count_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        count_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
    );

    Ok(LessonCompletionRecord {
        id: Some(row.try_get("id").map_err(ser)?),
        attempt_id: attempt_id_from_str(&attempt)?,
        course_id: CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?),
        lesson_id: LessonId::new(row.try_get::<String, _>("lesson_id").map_err(ser)?),
        resume_lesson_id: LessonId::new(
            row.try_get::<String, _>("resume_lesson_id").map_err(ser)?,
        ),
        score,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_snapshot_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressSnapshot, StorageError> {
    let attempt: String = row.try_get("attempt_id").map_err(ser)?;
    let progress: String = row.try_get("progress").map_err(ser)?;

    Ok(ProgressSnapshot {
        attempt_id: attempt_id_from_str(&attempt)?,
        course_id: CourseId::new(row.try_get::<String, _>("course_id").map_err(ser)?),
        progress: serde_json::from_str(&progress).map_err(ser)?,
        saved_at: row.try_get("saved_at").map_err(ser)?,
    })
}
