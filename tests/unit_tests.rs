// Unit tests for the compatibility engine

use valentine_match::core::{compatibility_score, compatibility_score_with, evaluate_pair, one_way_score, OneWayScore};
use valentine_match::models::{Answer, AnswerRecord, Importance, ImportanceWeights, ScoringError, UserAnswerSet};

fn answer(question_id: &str, mine: &str, desired: &str, importance: Importance) -> Answer {
    Answer {
        question_id: question_id.to_string(),
        my_attribute: mine.to_string(),
        desired_attribute: desired.to_string(),
        importance,
    }
}

fn user(id: &str, answers: Vec<Answer>) -> UserAnswerSet {
    UserAnswerSet::new(id, answers).unwrap()
}

/// A handful of users with overlapping and disjoint questions
fn population() -> Vec<UserAnswerSet> {
    vec![
        user("alice", vec![
            answer("introvert-extrovert", "Introvert", "Introvert", Importance::Dealbreaker),
            answer("spender-saver", "Saver", "Saver", Importance::Important),
            answer("height", "Average", "Tall", Importance::Important),
        ]),
        user("bob", vec![
            answer("introvert-extrovert", "Introvert", "Extrovert", Importance::Important),
            answer("spender-saver", "Spender", "Saver", Importance::Irrelevant),
            answer("height", "Tall", "Average", Importance::Important),
        ]),
        user("carol", vec![
            answer("morning-night", "Night Owl", "Night Owl", Importance::Dealbreaker),
        ]),
        user("dave", vec![
            answer("introvert-extrovert", "Extrovert", "Introvert", Importance::Important),
            answer("morning-night", "Morning Person", "Night Owl", Importance::Important),
        ]),
        UserAnswerSet::empty("erin"),
    ]
}

#[test]
fn test_scenario_dealbreaker_mismatch() {
    let a = user("a", vec![answer("q1", "Introvert", "Extrovert", Importance::Dealbreaker)]);
    let b = user("b", vec![answer("q1", "Introvert", "Introvert", Importance::Irrelevant)]);

    assert_eq!(compatibility_score(&a, &b), 0.0);
}

#[test]
fn test_scenario_directional_half_match() {
    let a = user("a", vec![answer("q1", "Slim", "Tall", Importance::Important)]);
    let b = user("b", vec![answer("q1", "Tall", "Athletic", Importance::Important)]);

    assert_eq!(compatibility_score(&a, &b), 50.0);
}

#[test]
fn test_scenario_irrelevant_vs_empty() {
    let a = user("a", vec![answer("q1", "Tall", "Tall", Importance::Irrelevant)]);
    let b = UserAnswerSet::empty("b");

    assert_eq!(compatibility_score(&a, &b), 100.0);
}

#[test]
fn test_scenario_one_of_two_important() {
    let a = user("a", vec![
        answer("q1", "x", "Tall", Importance::Important),
        answer("q2", "x", "Saver", Importance::Important),
    ]);
    let b = user("b", vec![
        answer("q1", "Tall", "x", Importance::Irrelevant),
        answer("q2", "Spender", "x", Importance::Irrelevant),
    ]);

    assert_eq!(one_way_score(&a, &b, &ImportanceWeights::default()), OneWayScore::Score(50.0));
}

#[test]
fn test_symmetry_across_population() {
    let users = population();
    for a in &users {
        for b in &users {
            assert_eq!(
                compatibility_score(a, b),
                compatibility_score(b, a),
                "asymmetric score for {} / {}",
                a.user_id(),
                b.user_id()
            );
        }
    }
}

#[test]
fn test_scores_stay_in_bounds() {
    let users = population();
    for a in &users {
        for b in &users {
            let score = compatibility_score(a, b);
            assert!((0.0..=100.0).contains(&score));

            if let OneWayScore::Score(one_way) = one_way_score(a, b, &ImportanceWeights::default()) {
                assert!((0.0..=100.0).contains(&one_way));
            }
        }
    }
}

#[test]
fn test_dealbreaker_dominates_other_matches() {
    let mut answers: Vec<Answer> = (0..10)
        .map(|i| answer(&format!("q{}", i), "same", "same", Importance::Important))
        .collect();
    answers.push(answer("deal", "Saver", "Saver", Importance::Dealbreaker));
    let a = user("a", answers);

    let mut candidate_answers: Vec<Answer> = (0..10)
        .map(|i| answer(&format!("q{}", i), "same", "same", Importance::Important))
        .collect();
    candidate_answers.push(answer("deal", "Spender", "Saver", Importance::Irrelevant));
    let b = user("b", candidate_answers);

    assert_eq!(compatibility_score(&a, &b), 0.0);
    // Also when the dealbreaker belongs to the other side
    assert_eq!(compatibility_score(&b, &a), 0.0);
}

#[test]
fn test_important_mismatch_costs_less_than_dealbreaker() {
    let candidate = user("b", vec![
        answer("q1", "Saver", "x", Importance::Irrelevant),
        answer("q2", "Night Owl", "x", Importance::Irrelevant),
    ]);

    let important = user("a", vec![
        answer("q1", "x", "Saver", Importance::Important),
        answer("q2", "x", "Morning Person", Importance::Important),
    ]);
    let dealbreaker = user("a", vec![
        answer("q1", "x", "Saver", Importance::Important),
        answer("q2", "x", "Morning Person", Importance::Dealbreaker),
    ]);

    let soft = compatibility_score(&important, &candidate);
    let hard = compatibility_score(&dealbreaker, &candidate);
    assert!(soft > hard);
    assert_eq!(hard, 0.0);
}

#[test]
fn test_no_overlap_is_vacuous_even_with_dealbreakers() {
    let a = user("a", vec![
        answer("q1", "x", "Tall", Importance::Dealbreaker),
        answer("q2", "x", "Saver", Importance::Dealbreaker),
    ]);
    let b = user("b", vec![answer("q3", "Indoors", "Outdoors", Importance::Important)]);

    assert_eq!(compatibility_score(&a, &b), 100.0);
}

#[test]
fn test_scoring_does_not_mutate_inputs() {
    let users = population();
    let before: Vec<Vec<Answer>> = users.iter().map(|u| u.answers().to_vec()).collect();

    for a in &users {
        for b in &users {
            evaluate_pair(a, b, &ImportanceWeights::default());
        }
    }

    let after: Vec<Vec<Answer>> = users.iter().map(|u| u.answers().to_vec()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_evaluate_pair_agrees_with_compatibility_score() {
    let users = population();
    let weights = ImportanceWeights::new(8.0, 2.0).unwrap();
    for a in &users {
        for b in &users {
            assert_eq!(evaluate_pair(a, b, &weights).score, compatibility_score_with(a, b, &weights));
        }
    }
}

#[test]
fn test_unrecognized_importance_from_records() {
    let records = vec![
        AnswerRecord {
            question_id: "q1".to_string(),
            my_attribute: "Tall".to_string(),
            desired_attribute: "Tall".to_string(),
            importance: "Important".to_string(),
        },
        AnswerRecord {
            question_id: "q2".to_string(),
            my_attribute: "Saver".to_string(),
            desired_attribute: "Saver".to_string(),
            importance: "VeryImportant".to_string(),
        },
    ];

    let err = UserAnswerSet::from_records("a", records).unwrap_err();
    assert_eq!(err, ScoringError::UnrecognizedImportance("VeryImportant".to_string()));
    assert!(err.to_string().contains("VeryImportant"));
}
