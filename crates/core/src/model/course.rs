use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, QuickCheckId, ScenarioId};
use crate::model::lesson::Lesson;
use crate::model::scenario::Scenario;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems that make course content unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course must contain at least one lesson")]
    NoLessons,

    #[error("duplicate lesson id: {0}")]
    DuplicateLesson(LessonId),

    #[error("duplicate quick-check id {quick_check} in lesson {lesson}")]
    DuplicateQuickCheck {
        lesson: LessonId,
        quick_check: QuickCheckId,
    },

    #[error("duplicate option id in quick-check {quick_check} of lesson {lesson}")]
    DuplicateOption {
        lesson: LessonId,
        quick_check: QuickCheckId,
    },

    #[error("quick-check {quick_check} in lesson {lesson} has more than one correct option")]
    MultipleCorrectOptions {
        lesson: LessonId,
        quick_check: QuickCheckId,
    },

    #[error("duplicate scenario id: {0}")]
    DuplicateScenario(ScenarioId),

    #[error("duplicate action id in scenario {0}")]
    DuplicateAction(ScenarioId),
}

//
// ─── ISSUES ────────────────────────────────────────────────────────────────────
//

/// Authoring smells that are tolerated but worth surfacing to content owners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    /// Scores 0/0, and under the strict policy the lesson can never complete.
    NoCorrectOption {
        lesson: LessonId,
        quick_check: QuickCheckId,
    },
    /// Scores 0/0 however the learner answers.
    NoCorrectAction { scenario: ScenarioId },
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentIssue::NoCorrectOption {
                lesson,
                quick_check,
            } => write!(
                f,
                "quick-check {quick_check} in lesson {lesson} has no correct option"
            ),
            ContentIssue::NoCorrectAction { scenario } => {
                write!(f, "scenario {scenario} has no correct action")
            }
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Course content as delivered by the authoring system, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub id: CourseId,
    pub title: String,
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl CourseDraft {
    /// Validate the draft into immutable course content.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` for an empty title, an empty lesson list,
    /// duplicate ids at any level, or a quick-check with several correct options.
    pub fn validate(self) -> Result<CourseContent, ContentError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ContentError::EmptyTitle);
        }
        if self.lessons.is_empty() {
            return Err(ContentError::NoLessons);
        }

        let mut lesson_ids = HashSet::new();
        for lesson in &self.lessons {
            if !lesson_ids.insert(lesson.id()) {
                return Err(ContentError::DuplicateLesson(lesson.id().clone()));
            }
            validate_lesson(lesson)?;
        }

        let mut scenario_ids = HashSet::new();
        for scenario in &self.scenarios {
            if !scenario_ids.insert(scenario.id()) {
                return Err(ContentError::DuplicateScenario(scenario.id().clone()));
            }
            let mut action_ids = HashSet::new();
            if !scenario.actions().iter().all(|a| action_ids.insert(a.id())) {
                return Err(ContentError::DuplicateAction(scenario.id().clone()));
            }
        }

        Ok(CourseContent {
            id: self.id,
            title,
            lessons: self.lessons,
            scenarios: self.scenarios,
        })
    }
}

fn validate_lesson(lesson: &Lesson) -> Result<(), ContentError> {
    let mut check_ids = HashSet::new();
    for check in lesson.quick_checks() {
        if !check_ids.insert(check.id()) {
            return Err(ContentError::DuplicateQuickCheck {
                lesson: lesson.id().clone(),
                quick_check: check.id().clone(),
            });
        }

        let mut option_ids = HashSet::new();
        if !check.options().iter().all(|o| option_ids.insert(o.id())) {
            return Err(ContentError::DuplicateOption {
                lesson: lesson.id().clone(),
                quick_check: check.id().clone(),
            });
        }

        if check.options().iter().filter(|o| o.is_correct()).count() > 1 {
            return Err(ContentError::MultipleCorrectOptions {
                lesson: lesson.id().clone(),
                quick_check: check.id().clone(),
            });
        }
    }
    Ok(())
}

//
// ─── COURSE CONTENT ────────────────────────────────────────────────────────────
//

/// Validated, read-only course content: lessons in order, then scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "CourseDraft")]
pub struct CourseContent {
    id: CourseId,
    title: String,
    lessons: Vec<Lesson>,
    scenarios: Vec<Scenario>,
}

impl TryFrom<CourseDraft> for CourseContent {
    type Error = ContentError;

    fn try_from(draft: CourseDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl CourseContent {
    /// Build content directly from parts.
    ///
    /// # Errors
    ///
    /// Same rules as [`CourseDraft::validate`].
    pub fn new(
        id: impl Into<CourseId>,
        title: impl Into<String>,
        lessons: Vec<Lesson>,
        scenarios: Vec<Scenario>,
    ) -> Result<Self, ContentError> {
        CourseDraft {
            id: id.into(),
            title: title.into(),
            lessons,
            scenarios,
        }
        .validate()
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[must_use]
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id().as_str() == id)
    }

    #[must_use]
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id().as_str() == id)
    }

    /// Non-fatal authoring issues, in content order.
    #[must_use]
    pub fn issues(&self) -> Vec<ContentIssue> {
        let mut issues = Vec::new();
        for lesson in &self.lessons {
            for check in lesson.quick_checks() {
                if check.correct_option().is_none() {
                    issues.push(ContentIssue::NoCorrectOption {
                        lesson: lesson.id().clone(),
                        quick_check: check.id().clone(),
                    });
                }
            }
        }
        for scenario in &self.scenarios {
            if scenario.correct_count() == 0 {
                issues.push(ContentIssue::NoCorrectAction {
                    scenario: scenario.id().clone(),
                });
            }
        }
        issues
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
