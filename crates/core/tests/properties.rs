use std::collections::{BTreeMap, BTreeSet};

use course_core::GateOptions;
use course_core::model::{ActionId, AnswerOption, OptionId, QuickCheck, QuickCheckId, ScenarioAction};
use course_core::scoring::{can_mark_lesson_complete, lesson_score, scenario_selection_score};
use proptest::prelude::*;

const OPTION_IDS: [&str; 4] = ["a", "b", "c", "d"];

/// Quick-checks with ids q0..qn, four options each, and at most one correct.
fn quick_checks() -> impl Strategy<Value = Vec<QuickCheck>> {
    prop::collection::vec(prop::option::of(0..OPTION_IDS.len()), 0..6).prop_map(|corrects| {
        corrects
            .into_iter()
            .enumerate()
            .map(|(i, correct)| {
                let options = OPTION_IDS
                    .iter()
                    .enumerate()
                    .map(|(j, id)| AnswerOption::new(*id, id.to_uppercase(), correct == Some(j)))
                    .collect();
                QuickCheck::new(format!("q{i}"), "?", options)
            })
            .collect()
    })
}

/// Arbitrary answers and reveal flags, including ids that match nothing.
fn answer_maps() -> impl Strategy<Value = (BTreeMap<QuickCheckId, OptionId>, BTreeSet<QuickCheckId>)> {
    let answers = prop::collection::btree_map(
        (0..8_usize).prop_map(|i| QuickCheckId::new(format!("q{i}"))),
        prop::sample::select(OPTION_IDS.to_vec()).prop_map(OptionId::new),
        0..8,
    );
    let revealed = prop::collection::btree_set(
        (0..8_usize).prop_map(|i| QuickCheckId::new(format!("q{i}"))),
        0..8,
    );
    (answers, revealed)
}

fn actions() -> impl Strategy<Value = Vec<ScenarioAction>> {
    prop::collection::vec(any::<bool>(), 0..6).prop_map(|flags| {
        flags
            .into_iter()
            .enumerate()
            .map(|(i, correct)| ScenarioAction::new(i.to_string(), "act", correct))
            .collect()
    })
}

proptest! {
    #[test]
    fn lesson_score_never_exceeds_total(checks in quick_checks(), (answers, revealed) in answer_maps()) {
        let score = lesson_score(&checks, &answers, &revealed);
        prop_assert!(score.score <= score.total);
        prop_assert!(score.total <= checks.len());
    }

    #[test]
    fn revealing_never_lowers_the_score(checks in quick_checks(), (answers, revealed) in answer_maps()) {
        let before = lesson_score(&checks, &answers, &revealed);
        for check in &checks {
            let mut more = revealed.clone();
            more.insert(check.id().clone());
            let after = lesson_score(&checks, &answers, &more);
            prop_assert!(after.score >= before.score);
            prop_assert_eq!(after.total, before.total);
        }
    }

    #[test]
    fn strict_completion_matches_its_definition(checks in quick_checks(), (answers, revealed) in answer_maps()) {
        let expected = checks.iter().all(|c| {
            revealed.contains(c.id())
                && c.correct_option().is_some_and(|o| answers.get(c.id()) == Some(o.id()))
        });
        prop_assert_eq!(
            can_mark_lesson_complete(&checks, &answers, &revealed, &GateOptions::default()),
            expected
        );
    }

    #[test]
    fn one_wrong_answer_fails_strict_completion(checks in quick_checks()) {
        let gradable: Vec<QuickCheck> =
            checks.into_iter().filter(|c| c.correct_option().is_some()).collect();
        prop_assume!(!gradable.is_empty());

        let mut answers: BTreeMap<QuickCheckId, OptionId> = gradable
            .iter()
            .filter_map(|c| c.correct_option().map(|o| (c.id().clone(), o.id().clone())))
            .collect();
        let revealed: BTreeSet<QuickCheckId> = gradable.iter().map(|c| c.id().clone()).collect();
        prop_assert!(can_mark_lesson_complete(&gradable, &answers, &revealed, &GateOptions::default()));

        let first = &gradable[0];
        let wrong = first.options().iter().find(|o| !o.is_correct()).map(|o| o.id().clone());
        prop_assume!(wrong.is_some());
        answers.insert(first.id().clone(), wrong.unwrap());
        prop_assert!(!can_mark_lesson_complete(&gradable, &answers, &revealed, &GateOptions::default()));
    }

    #[test]
    fn empty_lesson_is_always_completable((answers, revealed) in answer_maps(), strict in any::<bool>()) {
        let options = GateOptions { require_correct_to_complete: strict, ..GateOptions::default() };
        prop_assert!(can_mark_lesson_complete(&[], &answers, &revealed, &options));
    }

    #[test]
    fn scenario_score_is_zero_before_reveal(
        actions in actions(),
        picks in prop::collection::btree_set(0..6_usize, 0..6),
    ) {
        let selected: BTreeSet<ActionId> = picks.into_iter().map(|i| ActionId::new(i.to_string())).collect();
        let hidden = scenario_selection_score(&actions, Some(&selected), false);
        prop_assert_eq!(hidden.score, 0);
        prop_assert_eq!(hidden.total, actions.iter().filter(|a| a.is_correct()).count());

        let shown = scenario_selection_score(&actions, Some(&selected), true);
        prop_assert!(shown.score <= shown.total);
    }
}
