use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
    config::AppConfig,
    database::{DynCacheRepository, RedisDatabase},
};

use super::{
    auth_services::{AuthService, DynAuthService},
    base_document_services::{BaseDocumentService, DynBaseDocumentService},
    fetch_services::{DynFetchService, FetchService},
    geoblock_services::{DynGeoblockService, GeoblockService},
    guide_services::{DynGuideService, GuideService},
    playlist_services::{DynPlaylistService, PlaylistService},
    schedule_services::{DynScheduleService, ScheduleService},
};

/// everything the handlers need, built once at startup and cloned into every request
#[derive(Clone)]
pub struct EdgeServices {
    pub auth: DynAuthService,
    pub playlist: DynPlaylistService,
    pub guide: DynGuideService,
    pub geoblock: DynGeoblockService,
    // kept around separately for the health check, None when running on the memory cache
    pub redis: Option<Arc<RedisDatabase>>,
    pub config: Arc<AppConfig>,
}

impl EdgeServices {
    pub fn new(
        config: Arc<AppConfig>,
        cache: DynCacheRepository,
        redis: Option<Arc<RedisDatabase>>,
    ) -> anyhow::Result<Self> {
        let fetcher = Arc::new(FetchService::new()) as DynFetchService;
        Self::with_fetcher(config, cache, redis, fetcher)
    }

    /// same as [`EdgeServices::new`] but with the upstream http swapped out
    pub fn with_fetcher(
        config: Arc<AppConfig>,
        cache: DynCacheRepository,
        redis: Option<Arc<RedisDatabase>>,
        fetcher: DynFetchService,
    ) -> anyhow::Result<Self> {
        info!("starting edge services...");

        let feed_url = config
            .feed_url()
            .context("Could not build the schedule feed url")?;
        info!("schedule feed at {}", feed_url);

        let auth = Arc::new(AuthService::new(cache.clone(), fetcher.clone(), &config))
            as DynAuthService;

        let schedule =
            Arc::new(ScheduleService::new(cache, fetcher.clone(), feed_url)) as DynScheduleService;

        let base_documents =
            Arc::new(BaseDocumentService::new(fetcher.clone(), &config)) as DynBaseDocumentService;

        let playlist = Arc::new(PlaylistService::new(
            base_documents.clone(),
            schedule.clone(),
        )) as DynPlaylistService;

        let guide =
            Arc::new(GuideService::new(base_documents, schedule)) as DynGuideService;

        let geoblock = Arc::new(GeoblockService::new(fetcher, &config)) as DynGeoblockService;

        info!("edge services ok");

        Ok(Self {
            auth,
            playlist,
            guide,
            geoblock,
            redis,
            config,
        })
    }
}
