use serde::{Deserialize, Serialize};
use crate::models::domain::{Question, ScoredMatch};

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Questionnaire submission response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuestionnaireResponse {
    pub success: bool,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Question list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

/// Reveal countdown state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResponse {
    #[serde(rename = "revealAt")]
    pub reveal_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "isRevealed")]
    pub is_revealed: bool,
    #[serde(rename = "secondsRemaining")]
    pub seconds_remaining: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
