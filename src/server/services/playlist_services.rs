use std::fmt::Write;
use std::sync::Arc;

use tracing::info;

use crate::database::schedule::{Channel, Schedule};

use super::{
    base_document_services::DynBaseDocumentService, schedule_services::DynScheduleService,
};

pub type DynPlaylistService = Arc<dyn PlaylistServiceTrait + Send + Sync>;

#[mockall::automock]
#[async_trait::async_trait]
pub trait PlaylistServiceTrait {
    /// base playlist followed by one entry per scheduled channel pointing back at `base_url`
    async fn build_playlist(&self, base_url: &str) -> String;
}

pub struct PlaylistService {
    base_documents: DynBaseDocumentService,
    schedule: DynScheduleService,
}

impl PlaylistService {
    pub fn new(base_documents: DynBaseDocumentService, schedule: DynScheduleService) -> Self {
        Self {
            base_documents,
            schedule,
        }
    }
}

/// `#EXTINF` line plus the playback url
pub fn write_channel_entry(out: &mut String, channel: &Channel, base_url: &str) {
    let _ = writeln!(
        out,
        "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\", {}",
        channel.guide_id(),
        channel.logo_url,
        channel.name
    );
    let _ = writeln!(out, "{}/c/{}", base_url, channel.number);
}

pub fn merge_playlist(base: &str, schedule: &Schedule, base_url: &str) -> String {
    let mut out = String::with_capacity(base.len() + schedule.channels.len() * 128);

    out.push_str(base);
    for channel in &schedule.channels {
        write_channel_entry(&mut out, channel, base_url);
    }

    out
}

#[async_trait::async_trait]
impl PlaylistServiceTrait for PlaylistService {
    async fn build_playlist(&self, base_url: &str) -> String {
        info!("Using base url: '{}'", base_url);

        // both run at once, but nothing gets written until both are in so the base always leads
        let (base, schedule) = tokio::join!(
            self.base_documents.resolve_base_playlist(),
            self.schedule.resolve_schedule()
        );

        if base.is_empty() {
            info!("No base playlist content, writing channels only");
        }

        merge_playlist(&base, &schedule, base_url.trim_end_matches('/'))
    }
}
