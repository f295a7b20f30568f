use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use valentine_match::config::Settings;
use valentine_match::core::Matcher;
use valentine_match::routes::{self, handle_json_payload_error, AppState};
use valentine_match::services::{CacheManager, PostgresClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Valentine matching service...");
    info!("Configuration loaded successfully");

    // Without Redis the cache is local to this instance
    let ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = match &settings.cache.redis_url {
        Some(redis_url) => match CacheManager::new(redis_url, l1_size, ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_size, ttl)
            }
        },
        None => {
            info!("No Redis URL configured, using in-process cache only");
            CacheManager::in_memory(l1_size, ttl)
        }
    };
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_size,
        ttl,
        cache.is_shared()
    );
    let cache = Some(Arc::new(cache));

    let postgres = Arc::new(PostgresClient::from_settings(&settings.database).await.map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
    })?);

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let weights = settings.importance_weights().map_err(|e| {
        error!("Invalid scoring configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let matcher = Matcher::new(weights).with_min_score(settings.matching.min_score);

    info!("Matcher initialized with weights: {:?}", matcher.weights());
    info!("Matches reveal at {}", settings.matching.reveal_at.to_rfc3339());

    let app_state = AppState {
        postgres,
        cache,
        matcher,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
