use crate::models::{Candidate, CandidateRecords, ImportanceWeights, ScoredMatch, UserAnswerSet};
use crate::core::scoring::evaluate_pair;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Ranks candidates for a target user by compatibility
///
/// Candidates are scored independently against a fixed snapshot, so the
/// ranking is the same whatever order they arrive in: descending score,
/// ties broken by candidate id.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ImportanceWeights,
    min_score: f64,
}

impl Matcher {
    pub fn new(weights: ImportanceWeights) -> Self {
        Self {
            weights,
            min_score: 0.0,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ImportanceWeights::default())
    }

    /// Drop candidates scoring below `min_score` from the ranking
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn weights(&self) -> &ImportanceWeights {
        &self.weights
    }

    /// Find matches for a user among validated candidates
    ///
    /// # Arguments
    /// * `target` - The requesting user's answers
    /// * `candidates` - Every other user to consider
    /// * `limit` - Maximum number of matches to return
    pub fn find_matches(
        &self,
        target: &UserAnswerSet,
        candidates: Vec<Candidate>,
        limit: usize,
    ) -> MatchResult {
        let candidates: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.user.id != target.user_id())
            .collect();
        let total_candidates = candidates.len();

        let mut scored_matches: Vec<ScoredMatch> = candidates
            .into_iter()
            .filter_map(|candidate| {
                let eval = evaluate_pair(target, &candidate.answers, &self.weights);

                if eval.score < self.min_score {
                    return None;
                }

                Some(ScoredMatch {
                    user_id: candidate.user.id,
                    name: candidate.user.name,
                    gender: candidate.user.gender,
                    score: eval.score,
                    score_as_judge: eval.forward.value(),
                    score_as_candidate: eval.backward.value(),
                })
            })
            .collect();

        // Sort by score (descending) and then by id (ascending)
        scored_matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        scored_matches.truncate(limit);

        MatchResult {
            matches: scored_matches,
            total_candidates,
        }
    }

    /// Rank candidates straight from stored answer records
    ///
    /// A candidate with malformed records is left out of the ranking so one
    /// bad record does not block everyone else's results.
    pub fn rank_records(
        &self,
        target: &UserAnswerSet,
        candidates: Vec<CandidateRecords>,
        limit: usize,
    ) -> MatchResult {
        let candidates = candidates
            .into_iter()
            .filter_map(|record| {
                let user_id = record.user.id.clone();
                match UserAnswerSet::from_records(user_id.clone(), record.answers) {
                    Ok(answers) => Some(Candidate {
                        user: record.user,
                        answers,
                    }),
                    Err(e) => {
                        tracing::warn!("Skipping candidate {} with malformed answers: {}", user_id, e);
                        None
                    }
                }
            })
            .collect();

        self.find_matches(target, candidates, limit)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, AnswerRecord, Importance, User};

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            phone_number: format!("555-{}", id),
            name: Some(format!("User {}", id)),
            gender: Some("Female".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    fn answer(question_id: &str, mine: &str, desired: &str, importance: Importance) -> Answer {
        Answer {
            question_id: question_id.to_string(),
            my_attribute: mine.to_string(),
            desired_attribute: desired.to_string(),
            importance,
        }
    }

    fn candidate(id: &str, answers: Vec<Answer>) -> Candidate {
        Candidate {
            user: user(id),
            answers: UserAnswerSet::new(id, answers).unwrap(),
        }
    }

    fn target() -> UserAnswerSet {
        UserAnswerSet::new(
            "me",
            vec![
                answer("q1", "Introvert", "Introvert", Importance::Dealbreaker),
                answer("q2", "Saver", "Saver", Importance::Important),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ranks_by_descending_score() {
        let matcher = Matcher::with_default_weights();

        let candidates = vec![
            candidate("partial", vec![
                answer("q1", "Introvert", "Introvert", Importance::Irrelevant),
                answer("q2", "Spender", "Saver", Importance::Irrelevant),
            ]),
            candidate("perfect", vec![
                answer("q1", "Introvert", "Introvert", Importance::Important),
                answer("q2", "Saver", "Saver", Importance::Irrelevant),
            ]),
            candidate("dealbreaker", vec![
                answer("q1", "Extrovert", "Introvert", Importance::Irrelevant),
            ]),
        ];

        let result = matcher.find_matches(&target(), candidates, 10);

        let ids: Vec<&str> = result.matches.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["perfect", "partial", "dealbreaker"]);
        assert_eq!(result.matches[2].score, 0.0);
        assert_eq!(result.matches[2].score_as_judge, None);
        assert_eq!(result.total_candidates, 3);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![
            candidate("charlie", vec![]),
            candidate("alice", vec![]),
            candidate("bob", vec![]),
        ];

        let result = matcher.find_matches(&target(), candidates, 10);

        let ids: Vec<&str> = result.matches.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "charlie"]);
        assert!(result.matches.iter().all(|m| m.score == 100.0));
    }

    #[test]
    fn test_excludes_self() {
        let matcher = Matcher::with_default_weights();
        let candidates = vec![candidate("me", vec![]), candidate("other", vec![])];

        let result = matcher.find_matches(&target(), candidates, 10);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].user_id, "other");
        assert_eq!(result.total_candidates, 1);
    }

    #[test]
    fn test_respects_limit_and_min_score() {
        let matcher = Matcher::with_default_weights().with_min_score(1.0);
        let mut candidates: Vec<Candidate> = (0..20).map(|i| candidate(&format!("c{:02}", i), vec![])).collect();
        candidates.push(candidate("zero", vec![answer("q1", "Extrovert", "Introvert", Importance::Irrelevant)]));

        let limited = matcher.find_matches(&target(), candidates.clone(), 5);
        assert_eq!(limited.matches.len(), 5);

        let all = matcher.find_matches(&target(), candidates, 100);
        assert_eq!(all.matches.len(), 20);
        assert!(all.matches.iter().all(|m| m.user_id != "zero"));
    }

    #[test]
    fn test_rank_records_skips_malformed_candidate() {
        let matcher = Matcher::with_default_weights();
        let bad = CandidateRecords {
            user: user("bad"),
            answers: vec![AnswerRecord {
                question_id: "q1".to_string(),
                my_attribute: "Introvert".to_string(),
                desired_attribute: "Introvert".to_string(),
                importance: "Somewhat".to_string(),
            }],
        };
        let good = CandidateRecords {
            user: user("good"),
            answers: vec![],
        };

        let result = matcher.rank_records(&target(), vec![bad, good], 10);

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].user_id, "good");
    }
}
