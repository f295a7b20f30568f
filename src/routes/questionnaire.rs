use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::collections::HashSet;
use validator::Validate;

use crate::models::{duplicate_question, Answer, QuestionsResponse, SubmitQuestionnaireRequest, SubmitQuestionnaireResponse};
use crate::routes::{error_response, AppState};
use crate::services::Registration;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/questions", web::get().to(get_questions))
        .route("/questionnaire", web::post().to(submit_questionnaire));
}

/// List questionnaire questions
///
/// GET /api/v1/questions
async fn get_questions(state: web::Data<AppState>) -> impl Responder {
    match state.postgres.get_questions().await {
        Ok(questions) => HttpResponse::Ok().json(QuestionsResponse { questions }),
        Err(e) => {
            tracing::error!("Failed to fetch questions: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch questions", e.to_string())
        }
    }
}

/// Submit a questionnaire
///
/// POST /api/v1/questionnaire
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "phoneNumber": "string",
///   "gender": "string",
///   "answers": [
///     {
///       "questionId": "string",
///       "myAttribute": "string",
///       "desiredAttribute": "string",
///       "importance": "Dealbreaker|Important|Irrelevant"
///     }
///   ]
/// }
/// ```
///
/// Resubmitting with the same phone number replaces the user's answers.
async fn submit_questionnaire(
    state: web::Data<AppState>,
    req: web::Json<SubmitQuestionnaireRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for questionnaire submission: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let answers = match req
        .answers
        .iter()
        .cloned()
        .map(Answer::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(answers) => answers,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid importance",
                format!("{}; importance must be one of: Dealbreaker, Important, Irrelevant", e),
            );
        }
    };

    if let Some(question_id) = duplicate_question(&answers) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Duplicate answer",
            format!("Question {} is answered more than once", question_id),
        );
    }

    let known_questions: HashSet<String> = match state.postgres.get_questions().await {
        Ok(questions) => questions.into_iter().map(|q| q.id).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch questions: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch questions", e.to_string());
        }
    };

    if let Some(unknown) = answers
        .iter()
        .find(|a| !known_questions.contains(&a.question_id))
    {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Unknown question",
            format!("No question with id {}", unknown.question_id),
        );
    }

    let registration = Registration {
        name: &req.name,
        phone_number: &req.phone_number,
        gender: &req.gender,
    };

    let user_id = match state
        .postgres
        .submit_questionnaire(&registration, &answers)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to store questionnaire: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save data", e.to_string());
        }
    };

    tracing::info!("Stored questionnaire for user {} ({} answers)", user_id, answers.len());

    // Any new answer set can reorder everyone's rankings
    if let Some(cache) = &state.cache {
        if let Err(e) = cache.invalidate_after_submission().await {
            tracing::warn!("Failed to invalidate cached matches and stats: {}", e);
        }
    }

    HttpResponse::Ok().json(SubmitQuestionnaireResponse {
        success: true,
        user_id,
    })
}
