use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;

use super::fetch_services::DynFetchService;

/// what the playlist starts with when no base is configured
pub const DEFAULT_BASE_PLAYLIST: &str = "#EXTM3U\n";

/// and the guide equivalent
pub const DEFAULT_BASE_GUIDE: &str = "<tv></tv>";

pub type DynBaseDocumentService = Arc<dyn BaseDocumentServiceTrait + Send + Sync>;

/// the operator supplied seeds that generated content gets merged into. A failed fetch gives an
/// empty string which the merges treat as "no base", not as an error
#[mockall::automock]
#[async_trait::async_trait]
pub trait BaseDocumentServiceTrait {
    async fn resolve_base_playlist(&self) -> String;

    async fn resolve_base_guide(&self) -> String;
}

pub struct BaseDocumentService {
    fetcher: DynFetchService,
    playlist_url: Option<String>,
    guide_url: Option<String>,
}

impl BaseDocumentService {
    pub fn new(fetcher: DynFetchService, config: &AppConfig) -> Self {
        Self {
            fetcher,
            playlist_url: config.m3u_base.clone().filter(|u| !u.is_empty()),
            guide_url: config.epg_base.clone().filter(|u| !u.is_empty()),
        }
    }

    async fn resolve(&self, url: Option<&str>, fallback: &str) -> String {
        match url {
            Some(url) => {
                info!("Requesting base document at '{}'", url);
                self.fetcher.fetch(url).await.unwrap_or_default()
            }
            None => {
                info!("No base set, using the built in scaffold");
                fallback.to_string()
            }
        }
    }
}

#[async_trait::async_trait]
impl BaseDocumentServiceTrait for BaseDocumentService {
    async fn resolve_base_playlist(&self) -> String {
        self.resolve(self.playlist_url.as_deref(), DEFAULT_BASE_PLAYLIST)
            .await
    }

    async fn resolve_base_guide(&self) -> String {
        self.resolve(self.guide_url.as_deref(), DEFAULT_BASE_GUIDE)
            .await
    }
}
