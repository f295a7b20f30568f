use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::AnswerRecord;

/// Questionnaire submission: registration details plus every answer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuestionnaireRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 5, max = 32))]
    #[serde(alias = "phone_number", rename = "phoneNumber")]
    pub phone_number: String,
    #[validate(length(min = 1, max = 32))]
    pub gender: String,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
}

/// Request to find matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "phone_number", rename = "phoneNumber")]
    pub phone_number: String,
    pub limit: Option<u16>,
}
