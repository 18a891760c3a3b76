#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod progress_service;

pub use course_core::Clock;

pub use content::{load_course, parse_course};
pub use error::{ContentLoadError, ProgressServiceError};
pub use progress_service::{LessonCompletionResult, ProgressService};
