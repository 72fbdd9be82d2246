use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mockall::automock;
use tracing::{debug, error};

/// key the upstream auth hash is kept under
pub const AUTH_HASH_KEY: &str = "authHash";

/// key the raw schedule feed is kept under
pub const SCHEDULE_FEED_KEY: &str = "ssJsonEpgFeed";

pub type DynCacheRepository = Arc<dyn CacheRepository + Send + Sync>;

/// the only shared state in the service. Whatever backs this is expected to handle concurrent
/// writers on its own, nothing here locks around it.
#[automock]
#[async_trait::async_trait]
pub trait CacheRepository {
    /// a store failure is reported the same way as a miss
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// writes a value and logs how it went, the result is handed back for whoever still cares
pub async fn cache_value(
    cache: &(dyn CacheRepository + Send + Sync),
    key: &str,
    value: &str,
    ttl: Duration,
) -> Result<()> {
    // a zero ttl would either be rejected or live forever depending on the store
    if ttl.is_zero() {
        debug!("Skipping cache write for {} with empty ttl", key);
        return Ok(());
    }

    let result = cache.set(key, value, ttl).await;

    match &result {
        Ok(_) => debug!("Cached {} (TTL {}s)", key, ttl.as_secs()),
        Err(e) => error!("Error setting {} in cache: {}", key, e),
    }

    result
}

/// fire and forget version of [`cache_value`] so the caller never waits on the store
pub fn spawn_cache_value(cache: DynCacheRepository, key: &'static str, value: String, ttl: Duration) {
    tokio::spawn(async move {
        let _ = cache_value(cache.as_ref(), key, &value, ttl).await;
    });
}
