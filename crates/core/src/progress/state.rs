use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ActionId, LessonId, OptionId, QuickCheckId, ScenarioId};
use crate::scoring::Score;

/// Top-level tab of the course view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTab {
    #[default]
    Learn,
    Scenarios,
    /// Free-text approach exercise. Never gated.
    Approach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Answers and reveal flags for one lesson's quick-checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonProgress {
    pub(crate) answers: BTreeMap<QuickCheckId, OptionId>,
    pub(crate) revealed: BTreeSet<QuickCheckId>,
}

impl LessonProgress {
    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuickCheckId, OptionId> {
        &self.answers
    }

    #[must_use]
    pub fn revealed(&self) -> &BTreeSet<QuickCheckId> {
        &self.revealed
    }

    #[must_use]
    pub fn answer(&self, quick_check: &str) -> Option<&OptionId> {
        self.answers.get(quick_check)
    }

    #[must_use]
    pub fn is_revealed(&self, quick_check: &str) -> bool {
        self.revealed.contains(quick_check)
    }
}

/// Selected actions and reveal flag for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioProgress {
    pub(crate) selected: BTreeSet<ActionId>,
    pub(crate) revealed: bool,
}

impl ScenarioProgress {
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<ActionId> {
        &self.selected
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Everything a learner has done in one attempt at a course.
///
/// Owned and mutated only by `ProgressionEngine`; serializable so hosts can
/// persist and later resume it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerProgress {
    pub(crate) active_tab: ActiveTab,
    pub(crate) current_lesson_index: usize,
    pub(crate) lessons: BTreeMap<LessonId, LessonProgress>,
    pub(crate) completed_lesson_ids: BTreeSet<LessonId>,
    pub(crate) current_scenario_index: usize,
    pub(crate) scenarios: BTreeMap<ScenarioId, ScenarioProgress>,
}

impl LearnerProgress {
    #[must_use]
    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    #[must_use]
    pub fn current_lesson_index(&self) -> usize {
        self.current_lesson_index
    }

    #[must_use]
    pub fn current_scenario_index(&self) -> usize {
        self.current_scenario_index
    }

    #[must_use]
    pub fn completed_lesson_ids(&self) -> &BTreeSet<LessonId> {
        &self.completed_lesson_ids
    }

    #[must_use]
    pub fn lesson(&self, id: &str) -> Option<&LessonProgress> {
        self.lessons.get(id)
    }

    #[must_use]
    pub fn scenario(&self, id: &str) -> Option<&ScenarioProgress> {
        self.scenarios.get(id)
    }
}

/// Aggregated view of course progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseProgress {
    pub lessons_total: usize,
    pub lessons_completed: usize,
    pub learn: Score,
    pub scenarios_total: usize,
    pub scenarios_revealed: usize,
    pub scenarios: Score,
}

impl CourseProgress {
    #[must_use]
    pub fn lessons_complete(&self) -> bool {
        self.lessons_completed == self.lessons_total
    }
}
