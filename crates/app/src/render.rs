use std::io::{self, Write};

use course_core::model::{QuickCheck, Scenario};
use course_core::progress::LessonProgress;
use course_core::{ActiveTab, ProgressionEngine, Score};

pub fn score(score: Score) -> String {
    match score.percent() {
        Some(pct) => format!("{}/{} ({pct}%)", score.score, score.total),
        None => format!("{}/{}", score.score, score.total),
    }
}

fn tab_name(tab: ActiveTab) -> &'static str {
    match tab {
        ActiveTab::Learn => "learn",
        ActiveTab::Scenarios => "scenarios",
        ActiveTab::Approach => "approach",
    }
}

/// Full view: header, lesson list, then the active tab.
pub fn status(engine: &ProgressionEngine, out: &mut impl Write) -> io::Result<()> {
    let content = engine.content();
    let progress = engine.progress();

    writeln!(out, "== {} == (attempt {})", content.title(), engine.attempt_id())?;
    writeln!(
        out,
        "tab: {} | lessons {}/{} | learn score {}",
        tab_name(engine.active_tab()),
        progress.lessons_completed,
        progress.lessons_total,
        score(progress.learn)
    )?;
    if progress.scenarios_total > 0 {
        let lock = if engine.scenarios_unlocked() { "open" } else { "locked" };
        writeln!(
            out,
            "scenarios: {lock} | {}/{} checked | score {}",
            progress.scenarios_revealed,
            progress.scenarios_total,
            score(progress.scenarios)
        )?;
    }

    for (index, lesson) in content.lessons().iter().enumerate() {
        let cursor = if index == engine.current_lesson_index() { '>' } else { ' ' };
        let mark = if engine.is_lesson_completed(lesson.id().as_str()) {
            "[x]"
        } else if engine.is_lesson_unlocked(index) {
            "[ ]"
        } else {
            "[-]"
        };
        writeln!(out, "{cursor} {mark} {}. {}", index + 1, lesson.title())?;
    }
    writeln!(out)?;

    match engine.active_tab() {
        ActiveTab::Learn => lesson(engine, out),
        ActiveTab::Scenarios => match engine.current_scenario() {
            Some(current) => scenario(engine, current, out),
            None => writeln!(out, "(no scenarios)"),
        },
        ActiveTab::Approach => writeln!(
            out,
            "Approach: think through how you would handle this in your own setting."
        ),
    }
}

/// The current lesson with its quick-checks.
pub fn lesson(engine: &ProgressionEngine, out: &mut impl Write) -> io::Result<()> {
    let lesson = engine.current_lesson();
    let empty = LessonProgress::default();
    let progress = engine.state().lesson(lesson.id().as_str()).unwrap_or(&empty);

    writeln!(
        out,
        "Lesson {}/{}: {}",
        engine.current_lesson_index() + 1,
        engine.content().lessons().len(),
        lesson.title()
    )?;
    if !lesson.summary().is_empty() {
        writeln!(out, "{}", lesson.summary())?;
    }
    for bullet in lesson.bullets() {
        writeln!(out, "  - {bullet}")?;
    }
    for check in lesson.quick_checks() {
        quick_check(check, progress, out)?;
    }
    if !lesson.checklist().is_empty() {
        writeln!(out, "Checklist:")?;
        for item in lesson.checklist() {
            writeln!(out, "  [ ] {item}")?;
        }
    }
    for hint in lesson.hints() {
        writeln!(out, "Hint: {hint}")?;
    }

    let lesson_score = engine
        .lesson_score(lesson.id().as_str())
        .unwrap_or_default();
    let ready = if engine.is_lesson_completed(lesson.id().as_str()) {
        "completed"
    } else if engine.can_complete_current_lesson() {
        "ready to complete"
    } else {
        "in progress"
    };
    writeln!(out, "score {} | {ready}", score(lesson_score))
}

pub fn quick_check(
    check: &QuickCheck,
    progress: &LessonProgress,
    out: &mut impl Write,
) -> io::Result<()> {
    let id = check.id().as_str();
    let answer = progress.answer(id);
    let revealed = progress.is_revealed(id);

    writeln!(out, "  [{id}] {}", check.question())?;
    for option in check.options() {
        let selected = answer == Some(option.id());
        let pick = if selected { '*' } else { ' ' };
        let verdict = match (revealed, option.is_correct(), selected) {
            (true, true, _) => "  <- correct",
            (true, false, true) => "  <- not quite",
            _ => "",
        };
        writeln!(out, "   {pick} {}) {}{verdict}", option.id(), option.label())?;
        if revealed && selected && !option.explanation().is_empty() {
            writeln!(out, "       {}", option.explanation())?;
        }
    }
    Ok(())
}

/// One scenario with its actions and, once checked, feedback.
pub fn scenario(
    engine: &ProgressionEngine,
    scenario: &Scenario,
    out: &mut impl Write,
) -> io::Result<()> {
    let id = scenario.id().as_str();
    let progress = engine.state().scenario(id);
    let revealed = progress.is_some_and(|p| p.is_revealed());

    writeln!(
        out,
        "Scenario {}/{} [{id}]: {}",
        engine.current_scenario_index() + 1,
        engine.content().scenarios().len(),
        scenario.title()
    )?;
    writeln!(out, "{}", scenario.situation())?;
    for action in scenario.actions() {
        let selected = progress.is_some_and(|p| p.selected().contains(action.id()));
        let mark = if selected { "[x]" } else { "[ ]" };
        let verdict = match (revealed, action.is_correct()) {
            (true, true) => "  <- recommended",
            (true, false) if selected => "  <- not recommended",
            _ => "",
        };
        writeln!(out, "  {mark} {}. {}{verdict}", action.id(), action.label())?;
        if revealed && !action.explanation().is_empty() {
            writeln!(out, "       {}", action.explanation())?;
        }
    }
    if revealed {
        let scenario_score = engine.scenario_score(id).unwrap_or_default();
        writeln!(out, "score {}", score(scenario_score))?;
        for note in scenario.notes() {
            writeln!(out, "Note: {note}")?;
        }
    }
    Ok(())
}
