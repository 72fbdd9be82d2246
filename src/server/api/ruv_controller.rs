use axum::{Extension, Router, extract::Path, response::Response, routing::get};

use crate::server::{
    error::{AppResult, Error},
    services::edge_services::EdgeServices,
};

use super::channel_controller::found;

pub struct RuvController;

impl RuvController {
    pub fn app() -> Router {
        Router::new().route("/{chan}", get(Self::redirect))
    }

    async fn redirect(
        Extension(services): Extension<EdgeServices>,
        Path(chan): Path<String>,
    ) -> AppResult<Response> {
        let url = services
            .geoblock
            .resolve_stream_url(&chan)
            .await
            .ok_or_else(|| Error::NotFound(format!("No stream found for {}", chan)))?;

        Ok(found(&url))
    }
}
