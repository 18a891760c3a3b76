use std::sync::Arc;

use crate::gate::GateOptions;
use crate::model::{AttemptId, CourseContent, Lesson, Scenario};
use crate::progress::state::{
    ActiveTab, CourseProgress, Direction, LearnerProgress, LessonProgress, ScenarioProgress,
};
use crate::progress::transition::{Rejection, Transition};
use crate::scoring::{self, Score};

/// Single source of truth for a learner's journey through one course.
///
/// Hosts render from the read accessors and drive the engine through the
/// transition methods. Every transition is synchronous and returns a
/// [`Transition`]; nothing but `Applied` mutates state. Quick-check
/// operations address the lesson currently shown.
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    content: Arc<CourseContent>,
    options: GateOptions,
    attempt_id: AttemptId,
    pub(crate) state: LearnerProgress,
}

impl ProgressionEngine {
    /// Start a fresh attempt.
    #[must_use]
    pub fn new(content: Arc<CourseContent>, options: GateOptions) -> Self {
        Self::with_attempt(content, options, AttemptId::generate())
    }

    #[must_use]
    pub fn with_attempt(
        content: Arc<CourseContent>,
        options: GateOptions,
        attempt_id: AttemptId,
    ) -> Self {
        Self {
            content,
            options,
            attempt_id,
            state: LearnerProgress::default(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &Arc<CourseContent> {
        &self.content
    }

    #[must_use]
    pub fn options(&self) -> &GateOptions {
        &self.options
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn state(&self) -> &LearnerProgress {
        &self.state
    }

    #[must_use]
    pub fn active_tab(&self) -> ActiveTab {
        self.state.active_tab
    }

    #[must_use]
    pub fn current_lesson_index(&self) -> usize {
        self.state.current_lesson_index
    }

    #[must_use]
    pub fn current_scenario_index(&self) -> usize {
        self.state.current_scenario_index
    }

    #[must_use]
    pub fn current_lesson(&self) -> &Lesson {
        &self.content.lessons()[self.state.current_lesson_index]
    }

    /// `None` only when the course has no scenarios.
    #[must_use]
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.content.scenarios().get(self.state.current_scenario_index)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.state.completed_lesson_ids.contains(lesson_id)
    }

    //
    // ─── LESSON TRANSITIONS ────────────────────────────────────────────────────
    //

    /// Record `option` as the answer to a quick-check of the current lesson.
    ///
    /// Overwritable until the quick-check is revealed.
    pub fn select_lesson_answer(&mut self, quick_check: &str, option: &str) -> Transition {
        let content = Arc::clone(&self.content);
        let lesson = &content.lessons()[self.state.current_lesson_index];
        let Some(check) = lesson.quick_check(quick_check) else {
            return Transition::NotFound.traced("select_lesson_answer");
        };
        let Some(option) = check.option(option) else {
            return Transition::NotFound.traced("select_lesson_answer");
        };

        let progress = self.state.lessons.entry(lesson.id().clone()).or_default();
        let outcome = if progress.revealed.contains(check.id()) {
            Transition::Rejected(Rejection::AlreadyRevealed)
        } else {
            match progress.answers.insert(check.id().clone(), option.id().clone()) {
                Some(previous) if &previous == option.id() => Transition::Unchanged,
                _ => Transition::Applied,
            }
        };
        outcome.traced("select_lesson_answer")
    }

    /// Reveal correctness for a quick-check of the current lesson. Irreversible.
    pub fn reveal_lesson_answer(&mut self, quick_check: &str) -> Transition {
        let content = Arc::clone(&self.content);
        let lesson = &content.lessons()[self.state.current_lesson_index];
        let Some(check) = lesson.quick_check(quick_check) else {
            return Transition::NotFound.traced("reveal_lesson_answer");
        };

        let outcome = match self.state.lessons.get_mut(lesson.id()) {
            Some(progress) if progress.answers.contains_key(check.id()) => {
                if progress.revealed.insert(check.id().clone()) {
                    Transition::Applied
                } else {
                    Transition::Unchanged
                }
            }
            _ => Transition::Rejected(Rejection::NoAnswerSelected),
        };
        outcome.traced("reveal_lesson_answer")
    }

    /// Mark the current lesson complete and move to the next one.
    ///
    /// This is the checkpoint that prevents skipping ahead. Hosts persist
    /// progress when it returns `Applied`.
    pub fn complete_current_lesson(&mut self) -> Transition {
        if !self.can_complete_current_lesson() {
            return Transition::Rejected(Rejection::LessonIncomplete)
                .traced("complete_current_lesson");
        }

        let lesson_id = self.current_lesson().id().clone();
        let newly_completed = self.state.completed_lesson_ids.insert(lesson_id.clone());
        let advanced = self.state.current_lesson_index + 1 < self.content.lessons().len();
        if advanced {
            self.state.current_lesson_index += 1;
        }

        if newly_completed {
            tracing::info!(lesson = %lesson_id, attempt = %self.attempt_id, "lesson completed");
        }
        let outcome = if newly_completed || advanced {
            Transition::Applied
        } else {
            Transition::Unchanged
        };
        outcome.traced("complete_current_lesson")
    }

    /// Step one lesson back or forward. Forward requires the current lesson
    /// to be complete.
    pub fn navigate_lesson(&mut self, direction: Direction) -> Transition {
        let index = self.state.current_lesson_index;
        let outcome = match direction {
            Direction::Previous if index == 0 => Transition::Rejected(Rejection::AtBoundary),
            Direction::Previous => {
                self.state.current_lesson_index = index - 1;
                Transition::Applied
            }
            Direction::Next if index + 1 >= self.content.lessons().len() => {
                Transition::Rejected(Rejection::AtBoundary)
            }
            Direction::Next if !self.is_lesson_completed(self.current_lesson().id().as_str()) => {
                Transition::Rejected(Rejection::LessonIncomplete)
            }
            Direction::Next => {
                self.state.current_lesson_index = index + 1;
                Transition::Applied
            }
        };
        outcome.traced("navigate_lesson")
    }

    /// Jump to a lesson by position. Allowed once every earlier lesson is complete.
    pub fn go_to_lesson(&mut self, index: usize) -> Transition {
        let outcome = if index >= self.content.lessons().len() {
            Transition::NotFound
        } else if index == self.state.current_lesson_index {
            Transition::Unchanged
        } else if !self.is_lesson_unlocked(index) {
            Transition::Rejected(Rejection::LessonLocked)
        } else {
            self.state.current_lesson_index = index;
            Transition::Applied
        };
        outcome.traced("go_to_lesson")
    }

    //
    // ─── TABS ──────────────────────────────────────────────────────────────────
    //

    /// Open the scenarios tab, subject to the lesson gate.
    pub fn go_to_scenarios(&mut self) -> Transition {
        let outcome = if self.content.scenarios().is_empty() {
            Transition::NotFound
        } else if !self.scenarios_unlocked() {
            Transition::Rejected(Rejection::ScenariosLocked)
        } else if self.state.active_tab == ActiveTab::Scenarios {
            Transition::Unchanged
        } else {
            self.state.active_tab = ActiveTab::Scenarios;
            Transition::Applied
        };
        outcome.traced("go_to_scenarios")
    }

    pub fn go_to_learn(&mut self) -> Transition {
        self.go_to_tab(ActiveTab::Learn)
    }

    /// Switch tabs. Only `Scenarios` is gated.
    pub fn go_to_tab(&mut self, tab: ActiveTab) -> Transition {
        if tab == ActiveTab::Scenarios {
            return self.go_to_scenarios();
        }
        let outcome = if self.state.active_tab == tab {
            Transition::Unchanged
        } else {
            self.state.active_tab = tab;
            Transition::Applied
        };
        outcome.traced("go_to_tab")
    }

    //
    // ─── SCENARIO TRANSITIONS ──────────────────────────────────────────────────
    //

    /// Add or remove an action from a scenario's selection.
    pub fn toggle_scenario_action(&mut self, scenario: &str, action: &str) -> Transition {
        let content = Arc::clone(&self.content);
        let Some(scenario) = content.scenario(scenario) else {
            return Transition::NotFound.traced("toggle_scenario_action");
        };
        let Some(action) = scenario.action(action) else {
            return Transition::NotFound.traced("toggle_scenario_action");
        };
        if !self.scenarios_unlocked() {
            return Transition::Rejected(Rejection::ScenariosLocked)
                .traced("toggle_scenario_action");
        }

        let progress = self.state.scenarios.entry(scenario.id().clone()).or_default();
        let outcome = if progress.revealed {
            Transition::Rejected(Rejection::AlreadyRevealed)
        } else {
            if !progress.selected.remove(action.id()) {
                progress.selected.insert(action.id().clone());
            }
            Transition::Applied
        };
        outcome.traced("toggle_scenario_action")
    }

    /// Reveal a scenario's feedback. Needs at least one selected action.
    pub fn reveal_scenario(&mut self, scenario: &str) -> Transition {
        let Some(id) = self.content.scenario(scenario).map(|s| s.id().clone()) else {
            return Transition::NotFound.traced("reveal_scenario");
        };
        if !self.scenarios_unlocked() {
            return Transition::Rejected(Rejection::ScenariosLocked).traced("reveal_scenario");
        }

        let outcome = match self.state.scenarios.get_mut(&id) {
            Some(progress) if progress.revealed => Transition::Unchanged,
            Some(progress) if !progress.selected.is_empty() => {
                progress.revealed = true;
                Transition::Applied
            }
            _ => Transition::Rejected(Rejection::NoActionSelected),
        };
        outcome.traced("reveal_scenario")
    }

    /// Clear a revealed scenario so it can be attempted again.
    pub fn retake_scenario(&mut self, scenario: &str) -> Transition {
        let Some(id) = self.content.scenario(scenario).map(|s| s.id().clone()) else {
            return Transition::NotFound.traced("retake_scenario");
        };
        if !self.scenarios_unlocked() {
            return Transition::Rejected(Rejection::ScenariosLocked).traced("retake_scenario");
        }

        let outcome = match self.state.scenarios.get_mut(&id) {
            Some(progress) if progress.revealed => {
                progress.selected.clear();
                progress.revealed = false;
                Transition::Applied
            }
            _ => Transition::Rejected(Rejection::NotRevealed),
        };
        outcome.traced("retake_scenario")
    }

    /// Step between scenarios. Scenarios are not gated against each other.
    pub fn navigate_scenario(&mut self, direction: Direction) -> Transition {
        let len = self.content.scenarios().len();
        let index = self.state.current_scenario_index;
        let outcome = if len == 0 {
            Transition::NotFound
        } else if !self.scenarios_unlocked() {
            Transition::Rejected(Rejection::ScenariosLocked)
        } else {
            match direction {
                Direction::Previous if index == 0 => Transition::Rejected(Rejection::AtBoundary),
                Direction::Previous => {
                    self.state.current_scenario_index = index - 1;
                    Transition::Applied
                }
                Direction::Next if index + 1 >= len => Transition::Rejected(Rejection::AtBoundary),
                Direction::Next => {
                    self.state.current_scenario_index = index + 1;
                    Transition::Applied
                }
            }
        };
        outcome.traced("navigate_scenario")
    }

    /// Retake the whole course: forget everything and start a new attempt.
    pub fn restart(&mut self) -> AttemptId {
        self.state = LearnerProgress::default();
        self.attempt_id = AttemptId::generate();
        tracing::info!(attempt = %self.attempt_id, course = %self.content.id(), "course restarted");
        self.attempt_id
    }

    //
    // ─── DERIVED VALUES ────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn can_complete_current_lesson(&self) -> bool {
        let lesson = self.current_lesson();
        let empty = LessonProgress::default();
        let progress = self.state.lessons.get(lesson.id()).unwrap_or(&empty);
        scoring::can_mark_lesson_complete(
            lesson.quick_checks(),
            &progress.answers,
            &progress.revealed,
            &self.options,
        )
    }

    /// True when every lesson before `index` is complete.
    #[must_use]
    pub fn is_lesson_unlocked(&self, index: usize) -> bool {
        let lessons = self.content.lessons();
        index < lessons.len()
            && lessons[..index]
                .iter()
                .all(|l| self.state.completed_lesson_ids.contains(l.id()))
    }

    #[must_use]
    pub fn lessons_complete(&self) -> bool {
        self.state.completed_lesson_ids.len() == self.content.lessons().len()
    }

    #[must_use]
    pub fn scenarios_unlocked(&self) -> bool {
        !self.options.lock_scenarios_until_lessons_done || self.lessons_complete()
    }

    #[must_use]
    pub fn lesson_score(&self, lesson_id: &str) -> Option<Score> {
        self.content.lesson(lesson_id).map(|l| self.score_lesson(l))
    }

    #[must_use]
    pub fn scenario_score(&self, scenario_id: &str) -> Option<Score> {
        self.content.scenario(scenario_id).map(|s| self.score_scenario(s))
    }

    /// Sum of lesson scores across the course.
    #[must_use]
    pub fn learn_totals(&self) -> Score {
        self.content.lessons().iter().map(|l| self.score_lesson(l)).sum()
    }

    /// Sum of scenario scores across the course.
    #[must_use]
    pub fn scenarios_totals(&self) -> Score {
        self.content.scenarios().iter().map(|s| self.score_scenario(s)).sum()
    }

    #[must_use]
    pub fn all_scenarios_revealed(&self) -> bool {
        self.content.scenarios().iter().all(|s| {
            self.state
                .scenarios
                .get(s.id())
                .is_some_and(|p| p.revealed)
        })
    }

    #[must_use]
    pub fn progress(&self) -> CourseProgress {
        let scenarios_revealed = self
            .content
            .scenarios()
            .iter()
            .filter(|s| self.state.scenarios.get(s.id()).is_some_and(|p| p.revealed))
            .count();
        CourseProgress {
            lessons_total: self.content.lessons().len(),
            lessons_completed: self.state.completed_lesson_ids.len(),
            learn: self.learn_totals(),
            scenarios_total: self.content.scenarios().len(),
            scenarios_revealed,
            scenarios: self.scenarios_totals(),
        }
    }

    fn score_lesson(&self, lesson: &Lesson) -> Score {
        let empty = LessonProgress::default();
        let progress = self.state.lessons.get(lesson.id()).unwrap_or(&empty);
        scoring::lesson_score(lesson.quick_checks(), &progress.answers, &progress.revealed)
    }

    fn score_scenario(&self, scenario: &Scenario) -> Score {
        let progress: Option<&ScenarioProgress> = self.state.scenarios.get(scenario.id());
        scoring::scenario_selection_score(
            scenario.actions(),
            progress.map(|p| &p.selected),
            progress.is_some_and(|p| p.revealed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, QuickCheck, ScenarioAction};

    fn engine() -> ProgressionEngine {
        let lesson = Lesson::new(
            "l1",
            "Only lesson",
            vec![
                QuickCheck::new(
                    "q1",
                    "Pick one",
                    vec![AnswerOption::new("a", "A", true), AnswerOption::new("b", "B", false)],
                ),
                QuickCheck::new("q2", "No right answer", vec![AnswerOption::new("a", "A", false)]),
            ],
        );
        let scenario = Scenario::new(
            "s1",
            "Check-in",
            "A friend goes quiet.",
            vec![
                ScenarioAction::new("1", "Ask how they are", true),
                ScenarioAction::new("2", "Change the subject", false),
                ScenarioAction::new("3", "Offer to meet", true),
            ],
        );
        let content = CourseContent::new("c", "Course", vec![lesson], vec![scenario]).unwrap();
        ProgressionEngine::new(Arc::new(content), GateOptions::default())
    }

    #[test]
    fn untouched_lesson_scores_against_its_answerable_checks() {
        let engine = engine();
        assert!(engine.state.lessons.is_empty());

        let lesson = engine.current_lesson();
        assert_eq!(engine.score_lesson(lesson), Score::new(0, 1));
    }

    #[test]
    fn untouched_scenario_scores_zero_of_its_correct_actions() {
        let engine = engine();
        assert!(engine.state.scenarios.is_empty());

        let scenario = &engine.content.scenarios()[0];
        assert_eq!(engine.score_scenario(scenario), Score::new(0, 2));
        assert_eq!(engine.scenarios_totals(), Score::new(0, 2));
        assert!(!engine.all_scenarios_revealed());
    }
}
