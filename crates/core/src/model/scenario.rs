use serde::{Deserialize, Serialize};

use crate::model::ids::{ActionId, ScenarioId};

/// One candidate response in a scenario. Several actions may be correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAction {
    id: ActionId,
    label: String,
    #[serde(default)]
    correct: bool,
    #[serde(default)]
    explanation: String,
}

impl ScenarioAction {
    #[must_use]
    pub fn new(id: impl Into<ActionId>, label: impl Into<String>, correct: bool) -> Self {
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
    pub fn id(&self) -> &ActionId {
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

/// Situational-judgement exercise with multi-select actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    id: ScenarioId,
    title: String,
    #[serde(default)]
    situation: String,
    actions: Vec<ScenarioAction>,
    #[serde(default)]
    notes: Vec<String>,
}

impl Scenario {
    #[must_use]
    pub fn new(
        id: impl Into<ScenarioId>,
        title: impl Into<String>,
        situation: impl Into<String>,
        actions: Vec<ScenarioAction>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            situation: situation.into(),
            actions,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ScenarioId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn situation(&self) -> &str {
        &self.situation
    }

    #[must_use]
    pub fn actions(&self) -> &[ScenarioAction] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, id: &str) -> Option<&ScenarioAction> {
        self.actions.iter().find(|a| a.id.as_str() == id)
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Number of actions marked correct.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.actions.iter().filter(|a| a.correct).count()
    }
}
