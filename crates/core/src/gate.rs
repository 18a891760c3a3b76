use serde::{Deserialize, Serialize};

/// Gating policy applied by the progression engine.
///
/// Both flags default to `true`, the strict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateOptions {
    /// A lesson completes only when every quick-check was answered correctly.
    /// When `false`, answering and revealing each quick-check is enough.
    pub require_correct_to_complete: bool,
    /// The scenarios tab stays closed until every lesson is complete.
    pub lock_scenarios_until_lessons_done: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            require_correct_to_complete: true,
            lock_scenarios_until_lessons_done: true,
        }
    }
}

impl GateOptions {
    /// No gating at all: any revealed answer completes a lesson and
    /// scenarios are open from the start.
    #[must_use]
    pub fn ungated() -> Self {
        Self {
            require_correct_to_complete: false,
            lock_scenarios_until_lessons_done: false,
        }
    }
}
