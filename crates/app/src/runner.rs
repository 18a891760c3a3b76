use std::io::Write;

use course_core::{ActiveTab, Direction, ProgressionEngine, Transition};
use services::ProgressService;

use crate::command::{Command, HELP};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drives one attempt: applies commands to the engine and saves a snapshot
/// after every state change.
pub struct Runner {
    service: ProgressService,
    engine: ProgressionEngine,
}

impl Runner {
    #[must_use]
    pub fn new(service: ProgressService, engine: ProgressionEngine) -> Self {
        Self { service, engine }
    }

    #[must_use]
    pub fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// # Errors
    ///
    /// Fails when progress cannot be persisted or output cannot be written.
    pub async fn execute(&mut self, command: Command, out: &mut impl Write) -> anyhow::Result<Flow> {
        let (label, transition) = match command {
            Command::Status => {
                render::status(&self.engine, out)?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Complete => {
                self.complete(out).await?;
                return Ok(Flow::Continue);
            }
            Command::History => {
                self.history(out).await?;
                return Ok(Flow::Continue);
            }
            Command::Restart => {
                let attempt = self.engine.restart();
                self.service.save_snapshot(&self.engine).await?;
                writeln!(out, "restarted as attempt {attempt}")?;
                return Ok(Flow::Continue);
            }
            Command::Answer { quick_check, option } => (
                "answer",
                self.engine.select_lesson_answer(&quick_check, &option),
            ),
            Command::Reveal { quick_check } => {
                let transition = self.engine.reveal_lesson_answer(&quick_check);
                if transition.is_applied() {
                    self.show_quick_check(&quick_check, out)?;
                }
                ("reveal", transition)
            }
            Command::Next => ("next", self.engine.navigate_lesson(Direction::Next)),
            Command::Prev => ("prev", self.engine.navigate_lesson(Direction::Previous)),
            Command::Lesson(number) => ("lesson", self.engine.go_to_lesson(number - 1)),
            Command::Learn => ("learn", self.engine.go_to_learn()),
            Command::Scenarios => ("scenarios", self.engine.go_to_scenarios()),
            Command::Approach => ("approach", self.engine.go_to_tab(ActiveTab::Approach)),
            Command::Toggle { scenario, action } => (
                "toggle",
                self.engine.toggle_scenario_action(&scenario, &action),
            ),
            Command::Check { scenario } => {
                let transition = self.engine.reveal_scenario(&scenario);
                if transition.is_applied() {
                    if let Some(current) = self.engine.content().scenario(&scenario) {
                        render::scenario(&self.engine, current, out)?;
                    }
                }
                ("check", transition)
            }
            Command::Retake { scenario } => ("retake", self.engine.retake_scenario(&scenario)),
            Command::ScenarioNext => ("snext", self.engine.navigate_scenario(Direction::Next)),
            Command::ScenarioPrev => ("sprev", self.engine.navigate_scenario(Direction::Previous)),
        };

        writeln!(out, "{label}: {transition}")?;
        if transition.is_applied() {
            self.service.save_snapshot(&self.engine).await?;
        }
        Ok(Flow::Continue)
    }

    fn show_quick_check(&self, quick_check: &str, out: &mut impl Write) -> std::io::Result<()> {
        let lesson = self.engine.current_lesson();
        let (Some(check), Some(progress)) = (
            lesson.quick_check(quick_check),
            self.engine.state().lesson(lesson.id().as_str()),
        ) else {
            return Ok(());
        };
        render::quick_check(check, progress, out)
    }

    async fn complete(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let result = self.service.complete_current_lesson(&mut self.engine).await?;
        writeln!(out, "complete: {}", result.transition)?;

        if let Some(record) = &result.record {
            writeln!(
                out,
                "recorded {} with score {}",
                record.lesson_id,
                render::score(record.score)
            )?;
        }
        if result.transition == Transition::Applied && result.lessons_complete {
            if self.engine.content().scenarios().is_empty() {
                writeln!(out, "all lessons complete")?;
            } else if self.engine.scenarios_unlocked() {
                writeln!(out, "all lessons complete; scenarios are open")?;
            }
        }
        Ok(())
    }

    async fn history(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let records = self
            .service
            .completion_history(self.engine.attempt_id())
            .await?;
        if records.is_empty() {
            writeln!(out, "no lessons completed in this attempt")?;
        }
        for record in records {
            writeln!(
                out,
                "{} {} -> {} score {}",
                record.completed_at.to_rfc3339(),
                record.lesson_id,
                record.resume_lesson_id,
                render::score(record.score)
            )?;
        }
        Ok(())
    }
}
