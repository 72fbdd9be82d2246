use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use sstv_edge::{AppConfig, DynCacheRepository, EdgeApplicationServer, Logger, MemoryCache, RedisDatabase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    // an unparseable JSONTVURL stops us right here
    let config = Arc::new(AppConfig::parse());

    // guards are kept alive to flush logs and keep sentry connected
    let _guards = Logger::init(&config);

    info!("logger and env prepped...");

    let (cache, redis) = match config.redis_url.as_deref() {
        Some(redis_url) => {
            info!("connecting to redis...");
            let redis = Arc::new(
                RedisDatabase::connect(redis_url)
                    .await
                    .context("where is the redis connection!!")?,
            );
            info!("redis connection ok");
            (redis.clone() as DynCacheRepository, Some(redis))
        }
        None => {
            info!("no REDIS_URL set, caching in process memory");
            (Arc::new(MemoryCache::new()) as DynCacheRepository, None)
        }
    };

    info!("starting edge server...");

    EdgeApplicationServer::serve(config, cache, redis)
        .await
        .context("edge server failed to start")?;

    Ok(())
}
