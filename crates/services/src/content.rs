//! Course loading from authoring-system JSON.

use std::path::Path;

use course_core::model::{CourseContent, CourseDraft};

use crate::error::ContentLoadError;

/// Parse and validate course JSON, logging every content issue.
///
/// # Errors
///
/// Returns `ContentLoadError::Parse` for malformed JSON and
/// `ContentLoadError::Invalid` when validation fails.
pub fn parse_course(json: &str) -> Result<CourseContent, ContentLoadError> {
    let draft: CourseDraft = serde_json::from_str(json)?;
    let content = draft.validate()?;

    for issue in content.issues() {
        tracing::warn!(course = %content.id(), %issue, "course content issue");
    }
    tracing::debug!(
        course = %content.id(),
        lessons = content.lessons().len(),
        scenarios = content.scenarios().len(),
        "course parsed"
    );
    Ok(content)
}

/// Read a course file from disk. See [`parse_course`].
///
/// # Errors
///
/// Returns `ContentLoadError::Read` if the file cannot be read, otherwise as
/// [`parse_course`].
pub fn load_course(path: &Path) -> Result<CourseContent, ContentLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| ContentLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = parse_course(&json)?;
    tracing::info!(course = %content.id(), path = %path.display(), "course loaded");
    Ok(content)
}
