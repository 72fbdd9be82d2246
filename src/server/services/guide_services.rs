use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    database::{
        guide::{GuideChannel, GuideDocument, Icon, Programme, TextLang},
        schedule::Schedule,
    },
    server::{
        error::{AppResult, Error},
        utils::time_utils::format_guide_time,
    },
};

use super::{
    base_document_services::DynBaseDocumentService, schedule_services::DynScheduleService,
};

// the base guide has shown up with line breaks inside text nodes before
static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n").expect("line break regex should compile"));

#[derive(Debug, Clone, PartialEq)]
pub enum GuideOutput {
    /// merged document, declaration included
    Document(String),
    /// base text exactly as it came in because it couldn't be parsed
    Passthrough(String),
}

pub type DynGuideService = Arc<dyn GuideServiceTrait + Send + Sync>;

#[mockall::automock]
#[async_trait::async_trait]
pub trait GuideServiceTrait {
    async fn build_guide(&self) -> AppResult<GuideOutput>;
}

pub struct GuideService {
    base_documents: DynBaseDocumentService,
    schedule: DynScheduleService,
}

impl GuideService {
    pub fn new(base_documents: DynBaseDocumentService, schedule: DynScheduleService) -> Self {
        Self {
            base_documents,
            schedule,
        }
    }
}

pub fn strip_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, "").into_owned()
}

/// appends a channel per scheduled channel and a programme per event, nothing already in the
/// document is touched
pub fn append_schedule(document: &mut GuideDocument, schedule: &Schedule) {
    for channel in &schedule.channels {
        let id = channel.guide_id();

        document.channels.push(GuideChannel {
            id: id.clone(),
            display_names: vec![TextLang::english(channel.name.clone())],
            icons: (!channel.logo_url.is_empty())
                .then(|| Icon {
                    src: channel.logo_url.clone(),
                })
                .into_iter()
                .collect(),
            urls: Vec::new(),
        });

        document
            .programmes
            .extend(channel.events.iter().map(|event| Programme {
                start: format_guide_time(&event.start),
                stop: Some(format_guide_time(&event.stop)),
                channel: id.clone(),
                titles: vec![TextLang::english(event.name.clone())],
                sub_titles: Vec::new(),
                descriptions: event
                    .description
                    .iter()
                    .filter(|d| !d.is_empty())
                    .map(|d| TextLang::english(d.clone()))
                    .collect(),
            }));
    }
}

#[async_trait::async_trait]
impl GuideServiceTrait for GuideService {
    async fn build_guide(&self) -> AppResult<GuideOutput> {
        let (base, schedule) = tokio::join!(
            self.base_documents.resolve_base_guide(),
            self.schedule.resolve_schedule()
        );

        let mut document = match GuideDocument::parse(&strip_line_breaks(&base)) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    "Could not parse base guide ({} bytes), passing it through: {}",
                    base.len(),
                    e
                );
                return Ok(GuideOutput::Passthrough(base));
            }
        };

        info!("Got {} channels from the base guide", document.channels.len());

        append_schedule(&mut document, &schedule);

        info!(
            "Guide has {} channels and {} programmes",
            document.channels.len(),
            document.programmes.len()
        );

        document
            .to_xml()
            .map(GuideOutput::Document)
            .map_err(|e| Error::InternalServerErrorWithContext(e.to_string()))
    }
}
