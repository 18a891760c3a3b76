use serde::{Deserialize, Serialize};

use crate::model::ids::{LessonId, OptionId, QuickCheckId};

//
// ─── ANSWER OPTION ─────────────────────────────────────────────────────────────
//

/// One selectable choice of a quick-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    id: OptionId,
    label: String,
    #[serde(default)]
    correct: bool,
    /// Shown once the learner reveals the quick-check.
    #[serde(default)]
    explanation: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>, correct: bool) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            correct,
            explanation: String::new(),
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── QUICK CHECK ───────────────────────────────────────────────────────────────
//

/// Single-answer multiple-choice question embedded in a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheck {
    id: QuickCheckId,
    question: String,
    options: Vec<AnswerOption>,
}

impl QuickCheck {
    #[must_use]
    pub fn new(
        id: impl Into<QuickCheckId>,
        question: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            options,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuickCheckId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn option(&self, id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id.as_str() == id)
    }

    /// The option marked correct, if the author provided one.
    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.correct)
    }

    /// True when `answer` is the id of the correct option.
    #[must_use]
    pub fn is_correct_answer(&self, answer: &OptionId) -> bool {
        self.correct_option().is_some_and(|o| &o.id == answer)
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A teaching unit: reading material followed by quick-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    id: LessonId,
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    bullets: Vec<String>,
    #[serde(default)]
    quick_checks: Vec<QuickCheck>,
    #[serde(default)]
    checklist: Vec<String>,
    #[serde(default)]
    hints: Vec<String>,
}

impl Lesson {
    #[must_use]
    pub fn new(
        id: impl Into<LessonId>,
        title: impl Into<String>,
        quick_checks: Vec<QuickCheck>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            bullets: Vec::new(),
            quick_checks,
            checklist: Vec::new(),
            hints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_bullets(mut self, bullets: Vec<String>) -> Self {
        self.bullets = bullets;
        self
    }

    #[must_use]
    pub fn with_checklist(mut self, checklist: Vec<String>) -> Self {
        self.checklist = checklist;
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: Vec<String>) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[must_use]
    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    #[must_use]
    pub fn quick_checks(&self) -> &[QuickCheck] {
        &self.quick_checks
    }

    #[must_use]
    pub fn quick_check(&self, id: &str) -> Option<&QuickCheck> {
        self.quick_checks.iter().find(|q| q.id.as_str() == id)
    }

    #[must_use]
    pub fn checklist(&self) -> &[String] {
        &self.checklist
    }

    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_option_check() -> QuickCheck {
        QuickCheck::new(
            "q1",
            "Who do you report a concern to?",
            vec![
                AnswerOption::new("a", "Your safeguarding lead", true),
                AnswerOption::new("b", "Nobody", false),
            ],
        )
    }

    #[test]
    fn correct_option_is_found() {
        let check = two_option_check();
        assert_eq!(check.correct_option().map(AnswerOption::id), Some(&OptionId::new("a")));
        assert!(check.is_correct_answer(&OptionId::new("a")));
        assert!(!check.is_correct_answer(&OptionId::new("b")));
    }

    #[test]
    fn check_without_correct_option_accepts_nothing() {
        let check = QuickCheck::new(
            "q1",
            "Which do you prefer?",
            vec![AnswerOption::new("a", "Tea", false), AnswerOption::new("b", "Coffee", false)],
        );
        assert!(check.correct_option().is_none());
        assert!(!check.is_correct_answer(&OptionId::new("a")));
    }

    #[test]
    fn lesson_deserializes_from_camel_case() {
        let json = r#"{
            "id": "l1",
            "title": "Spotting the signs",
            "quickChecks": [
                {"id": "q1", "question": "?", "options": [
                    {"id": "a", "label": "Yes", "correct": true, "explanation": "Right."}
                ]}
            ]
        }"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.id().as_str(), "l1");
        assert!(lesson.bullets().is_empty());
        let check = lesson.quick_check("q1").unwrap();
        assert_eq!(check.option("a").unwrap().explanation(), "Right.");
    }
}
