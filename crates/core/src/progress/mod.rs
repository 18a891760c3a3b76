//! Sequential course progression: lessons gate each other, and all lessons
//! gate the scenarios tab.

mod engine;
mod resume;
mod state;
mod transition;

pub use engine::ProgressionEngine;
pub use state::{ActiveTab, CourseProgress, Direction, LearnerProgress, LessonProgress, ScenarioProgress};
pub use transition::{Rejection, Transition};
