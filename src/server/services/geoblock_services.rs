use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;

use super::fetch_services::DynFetchService;

pub type DynGeoblockService = Arc<dyn GeoblockServiceTrait + Send + Sync>;

/// the ruv api answers with a list of candidate stream urls for the caller's region
#[derive(Debug, Clone, Deserialize)]
pub struct RuvChannelResponse {
    #[serde(alias = "Result", default)]
    pub result: Vec<String>,
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait GeoblockServiceTrait {
    /// stream url for a ruv channel, `None` means there's nothing to redirect to
    async fn resolve_stream_url(&self, channel: &str) -> Option<String>;
}

pub struct GeoblockService {
    fetcher: DynFetchService,
    geoblocked: bool,
    api_url: String,
    cdn_template: String,
}

impl GeoblockService {
    pub fn new(fetcher: DynFetchService, config: &AppConfig) -> Self {
        Self {
            fetcher,
            geoblocked: config.ruv_geoblocked,
            api_url: config.ruv_api_url.clone(),
            cdn_template: config.ruv_cdn_template.clone(),
        }
    }

    /// only plain identifiers make it into a url
    pub fn is_valid_channel(channel: &str) -> bool {
        !channel.is_empty()
            && channel
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn cdn_url(&self, channel: &str) -> String {
        self.cdn_template.replace("{channel}", channel)
    }

    fn api_url(&self, channel: &str) -> Option<Url> {
        let mut url = match Url::parse(&self.api_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid ruv api url '{}': {}", self.api_url, e);
                return None;
            }
        };
        url.query_pairs_mut().append_pair("channel", channel);
        Some(url)
    }

    async fn lookup(&self, channel: &str) -> Option<String> {
        let url = self.api_url(channel)?;
        let body = self.fetcher.fetch(url.as_str()).await?;

        let response: RuvChannelResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                warn!("Could not decode ruv response for {}: {}", channel, e);
                return None;
            }
        };

        response.result.into_iter().next()
    }
}

#[async_trait::async_trait]
impl GeoblockServiceTrait for GeoblockService {
    async fn resolve_stream_url(&self, channel: &str) -> Option<String> {
        if !Self::is_valid_channel(channel) {
            return None;
        }

        if !self.geoblocked {
            return Some(self.cdn_url(channel));
        }

        let url = self.lookup(channel).await;
        match &url {
            Some(url) => info!("Resolved ruv channel {} to {}", channel, url),
            None => warn!("No ruv stream found for {}", channel),
        }
        url
    }
}
