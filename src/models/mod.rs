// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    duplicate_question, AdminStats, Answer, AnswerRecord, Candidate, CandidateRecords, GenderCount, Importance,
    ImportanceWeights, Question, ScoredMatch, ScoringError, User, UserAnswerSet,
};
pub use requests::{FindMatchesRequest, SubmitQuestionnaireRequest};
pub use responses::{
    ErrorResponse, FindMatchesResponse, HealthResponse, QuestionsResponse, RevealResponse,
    SubmitQuestionnaireResponse,
};
