// Core algorithm exports
pub mod matcher;
pub mod scoring;

pub use matcher::{Matcher, MatchResult};
pub use scoring::{compatibility_score, compatibility_score_with, evaluate_pair, one_way_score, OneWayScore, PairEvaluation};
