mod course;
mod ids;
mod lesson;
mod scenario;

pub use course::{ContentError, ContentIssue, CourseContent, CourseDraft};
pub use ids::{ActionId, AttemptId, CourseId, LessonId, OptionId, ParseIdError, QuickCheckId, ScenarioId};
pub use lesson::{AnswerOption, Lesson, QuickCheck};
pub use scenario::{Scenario, ScenarioAction};
