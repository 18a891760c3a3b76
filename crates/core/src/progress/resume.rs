use std::sync::Arc;

use crate::gate::GateOptions;
use crate::model::{AttemptId, CourseContent};
use crate::progress::engine::ProgressionEngine;
use crate::progress::state::{ActiveTab, LearnerProgress, LessonProgress};
use crate::scoring;

impl ProgressionEngine {
    /// Rebuild an engine from persisted progress.
    ///
    /// Content may have changed since the progress was saved, so anything that
    /// no longer resolves is dropped and the gating invariants are re-applied:
    /// completed lessons must still satisfy the completion rule, the current
    /// lesson must be unlocked, and a locked scenarios tab falls back to `Learn`.
    #[must_use]
    pub fn resume(
        content: Arc<CourseContent>,
        options: GateOptions,
        attempt_id: AttemptId,
        progress: LearnerProgress,
    ) -> Self {
        let mut repairs = 0_usize;
        let state = sanitize(&content, &options, progress, &mut repairs);
        if repairs > 0 {
            tracing::warn!(
                attempt = %attempt_id,
                course = %content.id(),
                repairs,
                "resumed progress did not match course content"
            );
        }

        let mut engine = Self::with_attempt(content, options, attempt_id);
        engine.state = state;
        engine
    }
}

fn sanitize(
    content: &CourseContent,
    options: &GateOptions,
    mut progress: LearnerProgress,
    repairs: &mut usize,
) -> LearnerProgress {
    let mut note = |dropped: bool| {
        if dropped {
            *repairs += 1;
        }
    };

    // Lesson answers: known lesson, known quick-check, known option.
    let mut lessons = std::mem::take(&mut progress.lessons);
    let before = lessons.len();
    lessons.retain(|id, _| content.lesson(id.as_str()).is_some());
    note(lessons.len() != before);
    for (id, lesson_progress) in &mut lessons {
        let Some(lesson) = content.lesson(id.as_str()) else {
            continue;
        };
        let before = lesson_progress.answers.len() + lesson_progress.revealed.len();
        lesson_progress.answers.retain(|check_id, option_id| {
            lesson
                .quick_check(check_id.as_str())
                .is_some_and(|check| check.option(option_id.as_str()).is_some())
        });
        let answers = &lesson_progress.answers;
        lesson_progress.revealed.retain(|check_id| answers.contains_key(check_id));
        note(lesson_progress.answers.len() + lesson_progress.revealed.len() != before);
    }
    progress.lessons = lessons;

    // Completion must still hold under the current options.
    let empty = LessonProgress::default();
    let before = progress.completed_lesson_ids.len();
    let lesson_state = &progress.lessons;
    progress.completed_lesson_ids.retain(|id| {
        content.lesson(id.as_str()).is_some_and(|lesson| {
            let p = lesson_state.get(id).unwrap_or(&empty);
            scoring::can_mark_lesson_complete(lesson.quick_checks(), &p.answers, &p.revealed, options)
        })
    });
    note(progress.completed_lesson_ids.len() != before);

    // The current lesson may be no further than the first incomplete one.
    let first_incomplete = content
        .lessons()
        .iter()
        .position(|l| !progress.completed_lesson_ids.contains(l.id()))
        .unwrap_or(content.lessons().len() - 1);
    if progress.current_lesson_index > first_incomplete {
        progress.current_lesson_index = first_incomplete;
        note(true);
    }

    // Scenario selections: known scenario, known actions, reveal needs a selection.
    let before = progress.scenarios.len();
    progress.scenarios.retain(|id, _| content.scenario(id.as_str()).is_some());
    note(progress.scenarios.len() != before);
    for (id, scenario_progress) in &mut progress.scenarios {
        let Some(scenario) = content.scenario(id.as_str()) else {
            continue;
        };
        let before = scenario_progress.selected.len();
        scenario_progress
            .selected
            .retain(|action| scenario.action(action.as_str()).is_some());
        note(scenario_progress.selected.len() != before);
        if scenario_progress.revealed && scenario_progress.selected.is_empty() {
            scenario_progress.revealed = false;
            note(true);
        }
    }

    let last_scenario = content.scenarios().len().saturating_sub(1);
    if progress.current_scenario_index > last_scenario {
        progress.current_scenario_index = last_scenario;
        note(true);
    }

    if progress.active_tab == ActiveTab::Scenarios {
        let lessons_done = progress.completed_lesson_ids.len() == content.lessons().len();
        let locked = options.lock_scenarios_until_lessons_done && !lessons_done;
        if content.scenarios().is_empty() || locked {
            progress.active_tab = ActiveTab::Learn;
            note(true);
        }
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Lesson, QuickCheck, Scenario, ScenarioAction};
    use crate::progress::Transition;

    fn course() -> Arc<CourseContent> {
        let check = |id: &str| {
            QuickCheck::new(
                id,
                "?",
                vec![AnswerOption::new("a", "A", true), AnswerOption::new("b", "B", false)],
            )
        };
        let scenario = Scenario::new(
            "s1",
            "Late-night call",
            "A colleague phones you.",
            vec![ScenarioAction::new("1", "Listen", true), ScenarioAction::new("2", "Hang up", false)],
        );
        Arc::new(
            CourseContent::new(
                "course",
                "Course",
                vec![Lesson::new("l1", "One", vec![check("q1")]), Lesson::new("l2", "Two", vec![check("q1")])],
                vec![scenario],
            )
            .unwrap(),
        )
    }

    fn finished_first_lesson(content: &Arc<CourseContent>) -> ProgressionEngine {
        let mut engine = ProgressionEngine::new(Arc::clone(content), GateOptions::default());
        engine.select_lesson_answer("q1", "a");
        engine.reveal_lesson_answer("q1");
        assert_eq!(engine.complete_current_lesson(), Transition::Applied);
        engine
    }

    #[test]
    fn resume_round_trips_valid_progress() {
        let content = course();
        let engine = finished_first_lesson(&content);
        let json = serde_json::to_string(engine.state()).unwrap();
        let saved: LearnerProgress = serde_json::from_str(&json).unwrap();

        let resumed =
            ProgressionEngine::resume(Arc::clone(&content), GateOptions::default(), engine.attempt_id(), saved);
        assert_eq!(resumed.state(), engine.state());
        assert_eq!(resumed.current_lesson_index(), 1);
        assert!(resumed.is_lesson_completed("l1"));
    }

    #[test]
    fn resume_drops_unknown_content() {
        let content = course();
        let json = r#"{
            "current_lesson_index": 7,
            "lessons": {
                "gone": {"answers": {"q1": "a"}, "revealed": ["q1"]},
                "l1": {"answers": {"q1": "zzz", "q9": "a"}, "revealed": ["q1"]}
            },
            "completed_lesson_ids": ["gone"],
            "current_scenario_index": 4,
            "scenarios": {"s1": {"selected": ["1", "99"], "revealed": true}, "s9": {}}
        }"#;
        let saved: LearnerProgress = serde_json::from_str(json).unwrap();

        let resumed = ProgressionEngine::resume(content, GateOptions::default(), AttemptId::generate(), saved);
        let state = resumed.state();
        assert!(state.lesson("gone").is_none());
        assert!(state.lesson("l1").unwrap().answers().is_empty());
        assert!(state.lesson("l1").unwrap().revealed().is_empty());
        assert!(state.completed_lesson_ids().is_empty());
        assert_eq!(state.current_lesson_index(), 0);
        assert_eq!(state.current_scenario_index(), 0);
        let s1 = state.scenario("s1").unwrap();
        assert_eq!(s1.selected().len(), 1);
        assert!(s1.is_revealed());
        assert!(state.scenario("s9").is_none());
    }

    #[test]
    fn resume_revokes_completion_that_fails_stricter_options() {
        let content = course();
        let mut engine = ProgressionEngine::new(Arc::clone(&content), GateOptions::ungated());
        engine.select_lesson_answer("q1", "b");
        engine.reveal_lesson_answer("q1");
        assert_eq!(engine.complete_current_lesson(), Transition::Applied);

        let resumed = ProgressionEngine::resume(
            content,
            GateOptions::default(),
            engine.attempt_id(),
            engine.state().clone(),
        );
        assert!(!resumed.is_lesson_completed("l1"));
        assert_eq!(resumed.current_lesson_index(), 0);
        // The wrong answer stays frozen.
        assert!(resumed.state().lesson("l1").unwrap().is_revealed("q1"));
    }

    #[test]
    fn resume_closes_locked_scenarios_tab() {
        let json = r#"{"active_tab": "scenarios"}"#;
        let saved: LearnerProgress = serde_json::from_str(json).unwrap();
        let resumed =
            ProgressionEngine::resume(course(), GateOptions::default(), AttemptId::generate(), saved);
        assert_eq!(resumed.active_tab(), ActiveTab::Learn);
    }
}
