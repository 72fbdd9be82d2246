use std::time::{Duration, Instant};

use anyhow::Context;
use redis::AsyncCommands;
use redis::Client;
use redis::aio::MultiplexedConnection;
use tracing::{error, info};

use super::cache::CacheRepository;

#[derive(Debug, Clone)]
pub struct RedisDatabase {
    pub connection: MultiplexedConnection,
}

impl RedisDatabase {
    pub async fn connect(connection_string: &str) -> anyhow::Result<Self> {
        let client = Client::open(connection_string).context("Failed to create Redis client")?;

        let connection = client
            .get_multiplexed_tokio_connection()
            .await
            .context("Failed to connect to Redis database")?;

        info!("Redis connection established");

        Ok(Self { connection })
    }

    /// ping round trip in milliseconds
    pub async fn health_check(&self) -> anyhow::Result<f64> {
        let start = Instant::now();

        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;

        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

#[async_trait::async_trait]
impl CacheRepository for RedisDatabase {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.connection.clone();

        let result: Result<Option<String>, redis::RedisError> = conn.get(key).await;

        match result {
            Ok(value) => value,
            Err(e) => {
                error!("Error getting {} from redis: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.connection.clone();

        // SETEX only takes whole seconds
        let seconds = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .with_context(|| format!("Failed to set {} in redis", key))?;

        Ok(())
    }
}
