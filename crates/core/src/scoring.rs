//! Pure score calculators over course content and a learner's answers.
//!
//! Missing map entries always read as "unanswered" / "not revealed".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::gate::GateOptions;
use crate::model::{ActionId, OptionId, QuickCheck, QuickCheckId, ScenarioAction};

/// A `(score, total)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub score: usize,
    pub total: usize,
}

impl Score {
    #[must_use]
    pub fn new(score: usize, total: usize) -> Self {
        Self { score, total }
    }

    /// Whole-number percentage, rounded down. `None` when nothing is scorable.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = self.score.min(self.total) * 100 / self.total;
        u8::try_from(pct).ok()
    }
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score {
            score: self.score + rhs.score,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Score {
        iter.fold(Score::default(), Add::add)
    }
}

fn is_revealed(revealed: &BTreeSet<QuickCheckId>, check: &QuickCheck) -> bool {
    revealed.contains(check.id())
}

fn answered_correctly(answers: &BTreeMap<QuickCheckId, OptionId>, check: &QuickCheck) -> bool {
    answers
        .get(check.id())
        .is_some_and(|answer| check.is_correct_answer(answer))
}

/// Score of one lesson.
///
/// `total` counts quick-checks that have a correct option; `score` counts the
/// revealed ones whose stored answer is that option.
#[must_use]
pub fn lesson_score(
    quick_checks: &[QuickCheck],
    answers: &BTreeMap<QuickCheckId, OptionId>,
    revealed: &BTreeSet<QuickCheckId>,
) -> Score {
    quick_checks
        .iter()
        .filter(|check| check.correct_option().is_some())
        .fold(Score::default(), |acc, check| {
            let hit = is_revealed(revealed, check) && answered_correctly(answers, check);
            acc + Score::new(usize::from(hit), 1)
        })
}

/// Whether the lesson owning `quick_checks` may be marked complete.
///
/// Every quick-check must be revealed; under `require_correct_to_complete`
/// its answer must also be the correct option, otherwise any answer will do.
/// A lesson without quick-checks is always completable.
#[must_use]
pub fn can_mark_lesson_complete(
    quick_checks: &[QuickCheck],
    answers: &BTreeMap<QuickCheckId, OptionId>,
    revealed: &BTreeSet<QuickCheckId>,
    options: &GateOptions,
) -> bool {
    quick_checks.iter().all(|check| {
        if !is_revealed(revealed, check) {
            return false;
        }
        if options.require_correct_to_complete {
            answered_correctly(answers, check)
        } else {
            answers.contains_key(check.id())
        }
    })
}

/// Score of one scenario.
///
/// `total` counts correct actions. Before reveal, or without any selection,
/// the score is 0. Afterwards it counts correct actions that were selected;
/// wrong selections cost nothing.
#[must_use]
pub fn scenario_selection_score(
    actions: &[ScenarioAction],
    selected: Option<&BTreeSet<ActionId>>,
    revealed: bool,
) -> Score {
    let total = actions.iter().filter(|a| a.is_correct()).count();
    let score = match selected {
        Some(selected) if revealed => actions
            .iter()
            .filter(|a| a.is_correct() && selected.contains(a.id()))
            .count(),
        _ => 0,
    };
    Score::new(score, total)
}
