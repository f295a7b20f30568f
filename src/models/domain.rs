use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while turning raw answer records into scoreable answer sets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Unrecognized importance tag: {0:?}")]
    UnrecognizedImportance(String),

    #[error("Duplicate answer for question {question_id} from user {user_id}")]
    DuplicateAnswer { user_id: String, question_id: String },

    #[error("Invalid importance weights: {0}")]
    InvalidWeights(String),
}

/// How strongly a stated preference weighs in scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Importance {
    Dealbreaker,
    Important,
    Irrelevant,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Dealbreaker => "Dealbreaker",
            Importance::Important => "Important",
            Importance::Irrelevant => "Irrelevant",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Dealbreaker" => Ok(Importance::Dealbreaker),
            "Important" => Ok(Importance::Important),
            "Irrelevant" => Ok(Importance::Irrelevant),
            other => Err(ScoringError::UnrecognizedImportance(other.to_string())),
        }
    }
}

/// A user's answer to a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "myAttribute")]
    pub my_attribute: String,
    #[serde(rename = "desiredAttribute")]
    pub desired_attribute: String,
    pub importance: Importance,
}

/// Answer as stored, with the importance tag still unparsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "myAttribute")]
    pub my_attribute: String,
    #[serde(rename = "desiredAttribute")]
    pub desired_attribute: String,
    pub importance: String,
}

impl TryFrom<AnswerRecord> for Answer {
    type Error = ScoringError;

    fn try_from(record: AnswerRecord) -> Result<Self, Self::Error> {
        let importance = record.importance.parse()?;
        Ok(Answer {
            question_id: record.question_id,
            my_attribute: record.my_attribute,
            desired_attribute: record.desired_attribute,
            importance,
        })
    }
}

/// Immutable snapshot of one user's answers, keyed by question
///
/// Each question appears at most once; a second answer for the same question
/// is rejected at construction so it can never be counted twice.
#[derive(Debug, Clone)]
pub struct UserAnswerSet {
    user_id: String,
    answers: Vec<Answer>,
    by_question: HashMap<String, usize>,
}

/// First question id that appears more than once in `answers`, if any
pub fn duplicate_question(answers: &[Answer]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(answers.len());
    answers
        .iter()
        .map(|a| a.question_id.as_str())
        .find(|id| !seen.insert(*id))
}

impl UserAnswerSet {
    pub fn new(user_id: impl Into<String>, answers: Vec<Answer>) -> Result<Self, ScoringError> {
        let user_id = user_id.into();

        if let Some(question_id) = duplicate_question(&answers) {
            return Err(ScoringError::DuplicateAnswer {
                user_id,
                question_id: question_id.to_string(),
            });
        }

        let by_question = answers
            .iter()
            .enumerate()
            .map(|(idx, answer)| (answer.question_id.clone(), idx))
            .collect();

        Ok(Self {
            user_id,
            answers,
            by_question,
        })
    }

    /// Build an answer set from stored records, failing on the first malformed one
    pub fn from_records(
        user_id: impl Into<String>,
        records: Vec<AnswerRecord>,
    ) -> Result<Self, ScoringError> {
        let answers = records
            .into_iter()
            .map(Answer::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(user_id, answers)
    }

    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            answers: Vec::new(),
            by_question: HashMap::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.by_question.get(question_id).map(|&idx| &self.answers[idx])
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Registered waitlist user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Questionnaire entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub category: String,
}

/// Candidate user together with their stored answers
#[derive(Debug, Clone)]
pub struct CandidateRecords {
    pub user: User,
    pub answers: Vec<AnswerRecord>,
}

/// Candidate user with a validated answer set
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user: User,
    pub answers: UserAnswerSet,
}

/// Scored match result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub score: f64,
    /// How well the candidate fits the requesting user's preferences; `None` on a dealbreaker
    #[serde(rename = "scoreAsJudge")]
    pub score_as_judge: Option<f64>,
    /// How well the requesting user fits the candidate's preferences; `None` on a dealbreaker
    #[serde(rename = "scoreAsCandidate")]
    pub score_as_candidate: Option<f64>,
}

/// Numeric weight for each importance tier
///
/// `Irrelevant` always weighs zero and is skipped during scoring. Both other
/// weights are finite and positive, and a dealbreaker never weighs less than
/// an important answer, which keeps scores within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceWeights {
    dealbreaker: f64,
    important: f64,
}

impl ImportanceWeights {
    pub fn new(dealbreaker: f64, important: f64) -> Result<Self, ScoringError> {
        for (tier, weight) in [("dealbreaker", dealbreaker), ("important", important)] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(ScoringError::InvalidWeights(format!(
                    "{} weight must be a positive number, got {}",
                    tier, weight
                )));
            }
        }

        if dealbreaker < important {
            return Err(ScoringError::InvalidWeights(format!(
                "dealbreaker weight {} is below important weight {}",
                dealbreaker, important
            )));
        }

        Ok(Self { dealbreaker, important })
    }

    pub fn dealbreaker(&self) -> f64 {
        self.dealbreaker
    }

    pub fn important(&self) -> f64 {
        self.important
    }

    #[inline]
    pub fn weight(&self, importance: Importance) -> f64 {
        match importance {
            Importance::Dealbreaker => self.dealbreaker,
            Importance::Important => self.important,
            Importance::Irrelevant => 0.0,
        }
    }
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            dealbreaker: 10.0,
            important: 5.0,
        }
    }
}

/// Per-gender user count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: Option<String>,
    pub count: i64,
}

/// Aggregate waitlist statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(rename = "genderBreakdown")]
    pub gender_breakdown: Vec<GenderCount>,
    #[serde(rename = "completedUsers")]
    pub completed_users: i64,
    #[serde(rename = "totalMatches")]
    pub total_matches: i64,
}
