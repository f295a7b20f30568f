//! Valentine Match - compatibility matching for the Valentine's waitlist
//!
//! Users answer a questionnaire about themselves and the partner they want.
//! The core scores every pair in both directions, with dealbreakers that
//! zero a pair outright and importance-weighted partial matches otherwise.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compatibility_score, one_way_score, Matcher, OneWayScore};
pub use models::{Answer, Importance, ImportanceWeights, ScoredMatch, ScoringError, UserAnswerSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let a = UserAnswerSet::empty("a");
        let b = UserAnswerSet::empty("b");
        assert_eq!(compatibility_score(&a, &b), 100.0);
    }
}
