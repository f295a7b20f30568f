use crate::models::{Importance, ImportanceWeights, UserAnswerSet};

/// Outcome of judging a candidate against one user's preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OneWayScore {
    /// Percentage in `[0, 100]`
    Score(f64),
    /// A dealbreaker preference was not met
    DealbreakerViolated,
}

impl OneWayScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            OneWayScore::Score(score) => Some(*score),
            OneWayScore::DealbreakerViolated => None,
        }
    }
}

/// Both directions of a pairwise evaluation plus the combined score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairEvaluation {
    /// `a` judging `b`
    pub forward: OneWayScore,
    /// `b` judging `a`
    pub backward: OneWayScore,
    pub score: f64,
}

/// Score `candidate` against `judge`'s stated preferences
///
/// Every judge answer with a non-zero weight that the candidate also answered
/// counts toward the maximum; it scores its weight when the judge's desired
/// attribute equals the candidate's own attribute. Irrelevant or unanswered
/// questions contribute nothing. An unmet dealbreaker ends the evaluation.
/// With nothing comparable the result is a vacuous 100.
pub fn one_way_score(
    judge: &UserAnswerSet,
    candidate: &UserAnswerSet,
    weights: &ImportanceWeights,
) -> OneWayScore {
    let mut accumulated = 0.0;
    let mut max_possible = 0.0;

    for judge_answer in judge.answers() {
        let weight = weights.weight(judge_answer.importance);
        if weight == 0.0 {
            continue;
        }

        let Some(candidate_answer) = candidate.answer_for(&judge_answer.question_id) else {
            continue;
        };

        if judge_answer.desired_attribute == candidate_answer.my_attribute {
            accumulated += weight;
        } else if judge_answer.importance == Importance::Dealbreaker {
            return OneWayScore::DealbreakerViolated;
        }

        max_possible += weight;
    }

    if max_possible == 0.0 {
        return OneWayScore::Score(100.0);
    }

    OneWayScore::Score((accumulated / max_possible) * 100.0)
}

/// Symmetric compatibility (0-100) between two users with the default weights
pub fn compatibility_score(a: &UserAnswerSet, b: &UserAnswerSet) -> f64 {
    compatibility_score_with(a, b, &ImportanceWeights::default())
}

/// Symmetric compatibility (0-100): the mean of both one-way scores, or 0 when
/// either direction hits a dealbreaker
pub fn compatibility_score_with(
    a: &UserAnswerSet,
    b: &UserAnswerSet,
    weights: &ImportanceWeights,
) -> f64 {
    let OneWayScore::Score(forward) = one_way_score(a, b, weights) else {
        return 0.0;
    };
    let OneWayScore::Score(backward) = one_way_score(b, a, weights) else {
        return 0.0;
    };

    (forward + backward) / 2.0
}

/// Evaluate both directions of a pair, keeping the one-way results
pub fn evaluate_pair(
    a: &UserAnswerSet,
    b: &UserAnswerSet,
    weights: &ImportanceWeights,
) -> PairEvaluation {
    let forward = one_way_score(a, b, weights);
    let backward = one_way_score(b, a, weights);

    let score = match (forward, backward) {
        (OneWayScore::Score(f), OneWayScore::Score(b)) => (f + b) / 2.0,
        _ => 0.0,
    };

    PairEvaluation {
        forward,
        backward,
        score,
    }
}
