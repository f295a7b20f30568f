use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::models::{FindMatchesRequest, FindMatchesResponse, RevealResponse};
use crate::routes::{error_response, AppState};
use crate::services::{CacheKey, PostgresError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/reveal", web::get().to(reveal_status))
        .route("/matches/find", web::post().to(find_matches));
}

/// Countdown state relative to `now`
pub fn reveal_state(reveal_at: DateTime<Utc>, now: DateTime<Utc>) -> RevealResponse {
    let remaining = (reveal_at - now).num_seconds();
    RevealResponse {
        reveal_at,
        is_revealed: now >= reveal_at,
        seconds_remaining: remaining.max(0),
    }
}

/// Reveal countdown endpoint
///
/// GET /api/v1/reveal
async fn reveal_status(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(reveal_state(state.matching.reveal_at, Utc::now()))
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "phoneNumber": "string",
///   "limit": 20
/// }
/// ```
///
/// Matches stay hidden until the configured reveal date.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let reveal = reveal_state(state.matching.reveal_at, Utc::now());
    if !reveal.is_revealed {
        return error_response(
            StatusCode::FORBIDDEN,
            "Matches not yet revealed",
            format!("Matches are revealed at {}", reveal.reveal_at.to_rfc3339()),
        );
    }

    let limit = state.matching.effective_limit(req.limit);

    let user = match state.postgres.find_user_by_phone(&req.phone_number).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "User not found",
                "No questionnaire has been submitted for this phone number",
            );
        }
        Err(e) => {
            tracing::error!("Failed to look up user: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch user", e.to_string());
        }
    };

    tracing::info!("Finding matches for user: {}, limit: {}", user.id, limit);

    let cache_key = CacheKey::matches(&user.id, limit);
    if let Some(cache) = &state.cache {
        if let Ok(cached) = cache.get::<FindMatchesResponse>(&cache_key).await {
            tracing::debug!("Serving cached matches for {}", user.id);
            return HttpResponse::Ok().json(cached);
        }
    }

    let target = match state.postgres.get_answer_set(&user.id).await {
        Ok(set) => set,
        Err(PostgresError::InvalidData(e)) => {
            tracing::error!("Stored answers for {} are malformed: {}", user.id, e);
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Malformed answers", e.to_string());
        }
        Err(e) => {
            tracing::error!("Failed to fetch answers for {}: {}", user.id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch answers", e.to_string());
        }
    };

    let candidates = match state.postgres.get_candidates(&user.id).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query candidates for {}: {}", user.id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to query candidates", e.to_string());
        }
    };

    let result = state.matcher.rank_records(&target, candidates, limit);

    match state.postgres.record_matches(&user.id, &result.matches).await {
        Ok(stored) => {
            tracing::debug!("Recorded {} match scores for {}", stored, user.id);
            if let Some(cache) = &state.cache {
                if let Err(e) = cache.invalidate_after_matches_recorded().await {
                    tracing::warn!("Failed to invalidate stats cache: {}", e);
                }
            }
        }
        Err(e) => tracing::warn!("Failed to record match scores for {}: {}", user.id, e),
    }

    let response = FindMatchesResponse {
        user_id: user.id.clone(),
        matches: result.matches,
        total_candidates: result.total_candidates,
    };

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&cache_key, &response).await {
            tracing::warn!("Failed to cache matches for {}: {}", user.id, e);
        }
    }

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        response.matches.len(),
        user.id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}
