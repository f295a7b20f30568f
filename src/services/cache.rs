use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Keys fetched per SCAN round trip while invalidating by pattern
const SCAN_BATCH: usize = 500;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier cache for ranked match lists and admin statistics
///
/// L1 is an in-process moka cache. L2 is Redis, shared across instances;
/// without it the cache runs on L1 alone.
pub struct CacheManager {
    redis: Option<ConnectionManager>,
    l1_cache: moka::future::Cache<String, String>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Connect to Redis and build the L1 tier
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(redis),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Process-local cache with no Redis tier
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.redis.is_some()
    }

    /// Look a value up in L1, falling back to Redis and warming L1 on a hit
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        if let Some(json) = self.l1_cache.get(key).await {
            tracing::trace!("L1 hit: {}", key);
            return Ok(serde_json::from_str(&json)?);
        }

        let Some(mut conn) = self.redis.clone() else {
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        let json = value.ok_or_else(|| CacheError::CacheMiss(key.to_string()))?;

        tracing::trace!("L2 hit: {}", key);
        let decoded = serde_json::from_str(&json)?;
        self.l1_cache.insert(key.to_string(), json).await;
        Ok(decoded)
    }

    /// Write a value to both tiers with the configured TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;

        if let Some(mut conn) = self.redis.clone() {
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(&json)
                .arg("EX")
                .arg(self.ttl_secs)
                .query_async(&mut conn)
                .await?;
        }

        self.l1_cache.insert(key.to_string(), json).await;
        tracing::trace!("Cached {}", key);
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(mut conn) = self.redis.clone() {
            let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        }
        Ok(())
    }

    /// Drop every entry whose key matches a glob pattern
    ///
    /// L1 has no pattern lookup and is cleared entirely. Redis keys are
    /// walked with incremental `SCAN` so the server is never blocked.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate_all();

        let Some(mut conn) = self.redis.clone() else {
            return Ok(());
        };

        let mut cursor: u64 = 0;
        let mut removed = 0usize;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                let _: () = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::debug!("Invalidated {} cached keys matching {}", removed, pattern);
        Ok(())
    }

    /// A questionnaire changed: every ranking and the stats are stale
    pub async fn invalidate_after_submission(&self) -> Result<(), CacheError> {
        self.invalidate_pattern(CacheKey::all_matches()).await?;
        self.delete(CacheKey::admin_stats()).await
    }

    /// New match rows were stored: only the stats are stale
    pub async fn invalidate_after_matches_recorded(&self) -> Result<(), CacheError> {
        self.delete(CacheKey::admin_stats()).await
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a user's ranked matches at a given page size
    pub fn matches(user_id: &str, limit: usize) -> String {
        format!("matches:{}:{}", user_id, limit)
    }

    /// Pattern covering every cached match list
    pub fn all_matches() -> &'static str {
        "matches:*"
    }

    pub fn admin_stats() -> &'static str {
        "stats:admin"
    }
}
