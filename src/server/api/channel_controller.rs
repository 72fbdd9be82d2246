use axum::{
    Extension, Router,
    extract::Path,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{info, warn};

use crate::server::{
    error::{AppResult, Error},
    services::edge_services::EdgeServices,
};

pub struct ChannelController;

impl ChannelController {
    pub fn app() -> Router {
        Router::new()
            .route("/", get(Self::playlist))
            .route("/{chan}", get(Self::redirect))
    }

    /// configured public url, otherwise whatever host the client used to reach us
    pub fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap) -> String {
        if let Some(base_url) = configured.filter(|u| !u.is_empty()) {
            return base_url.trim_end_matches('/').to_string();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost");

        format!("http://{}", host)
    }

    pub fn stream_url(host: &str, site: &str, channel: i64, hash: &str) -> String {
        format!(
            "https://{}/{}/ch{:02}q1.stream/playlist.m3u8?wmsAuthSign={}",
            host, site, channel, hash
        )
    }

    async fn playlist(Extension(services): Extension<EdgeServices>, headers: HeaderMap) -> String {
        let base_url = Self::resolve_base_url(services.config.base_url.as_deref(), &headers);

        services.playlist.build_playlist(&base_url).await
    }

    async fn redirect(
        Extension(services): Extension<EdgeServices>,
        Path(chan): Path<String>,
    ) -> AppResult<Response> {
        let channel: i64 = chan
            .parse()
            .map_err(|_| Error::NotFound(format!("No channel found for {}", chan)))?;

        info!("Creating url for chan {}...", channel);

        let hash = services.auth.resolve_auth_token().await.unwrap_or_else(|| {
            warn!("No auth hash available, redirecting chan {} unsigned", channel);
            String::new()
        });

        let url = Self::stream_url(
            &services.config.stream_host,
            &services.config.auth_site,
            channel,
            &hash,
        );
        info!("Url created... {}", url);

        Ok(found(&url))
    }
}

/// plain 302, axum's Redirect helpers only do 303/307/308
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
