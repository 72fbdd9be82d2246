use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::database::{
    DynCacheRepository, SCHEDULE_FEED_KEY, schedule::Schedule, spawn_cache_value,
};

use super::fetch_services::DynFetchService;

/// the feed changes often enough that a minute is all it gets
const SCHEDULE_FEED_TTL: Duration = Duration::from_secs(60);

pub type DynScheduleService = Arc<dyn ScheduleServiceTrait + Send + Sync>;

#[mockall::automock]
#[async_trait::async_trait]
pub trait ScheduleServiceTrait {
    /// sorted channels with their events, empty when the feed can't be had or read
    async fn resolve_schedule(&self) -> Schedule;
}

pub struct ScheduleService {
    cache: DynCacheRepository,
    fetcher: DynFetchService,
    feed_url: Url,
}

impl ScheduleService {
    pub fn new(cache: DynCacheRepository, fetcher: DynFetchService, feed_url: Url) -> Self {
        Self {
            cache,
            fetcher,
            feed_url,
        }
    }

    async fn raw_feed(&self) -> Option<String> {
        if let Some(feed) = self
            .cache
            .get(SCHEDULE_FEED_KEY)
            .await
            .filter(|f| !f.is_empty())
        {
            info!("Got schedule feed from cache");
            return Some(feed);
        }

        let Some(feed) = self.fetcher.fetch(self.feed_url.as_str()).await else {
            warn!("No schedule feed from {}, using an empty schedule", self.feed_url);
            return None;
        };

        if !feed.is_empty() {
            spawn_cache_value(
                self.cache.clone(),
                SCHEDULE_FEED_KEY,
                feed.clone(),
                SCHEDULE_FEED_TTL,
            );
        }

        Some(feed)
    }
}

#[async_trait::async_trait]
impl ScheduleServiceTrait for ScheduleService {
    async fn resolve_schedule(&self) -> Schedule {
        let Some(feed) = self.raw_feed().await else {
            return Schedule::default();
        };

        let schedule = Schedule::from_feed(&feed);
        info!(
            "Resolved schedule with {} channels and {} events",
            schedule.channels.len(),
            schedule.event_count()
        );

        schedule
    }
}
