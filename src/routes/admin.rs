use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::models::{AdminStats, HealthResponse};
use crate::routes::{error_response, AppState};
use crate::services::CacheKey;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/admin/stats", web::get().to(admin_stats));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Waitlist statistics endpoint
///
/// GET /api/v1/admin/stats
async fn admin_stats(state: web::Data<AppState>) -> impl Responder {
    if let Some(cache) = &state.cache {
        if let Ok(stats) = cache.get::<AdminStats>(CacheKey::admin_stats()).await {
            return HttpResponse::Ok().json(stats);
        }
    }

    match state.postgres.get_admin_stats().await {
        Ok(stats) => {
            if let Some(cache) = &state.cache {
                if let Err(e) = cache.set(CacheKey::admin_stats(), &stats).await {
                    tracing::warn!("Failed to cache admin stats: {}", e);
                }
            }
            HttpResponse::Ok().json(stats)
        }
        Err(e) => {
            tracing::error!("Failed to compute admin stats: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch statistics", e.to_string())
        }
    }
}
