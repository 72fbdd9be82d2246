use axum::{
    Extension, Router,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::server::{
    error::AppResult,
    services::{edge_services::EdgeServices, guide_services::GuideOutput},
};

pub struct GuideController;

impl GuideController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::guide))
    }

    async fn guide(Extension(services): Extension<EdgeServices>) -> AppResult<Response> {
        let response = match services.guide.build_guide().await? {
            GuideOutput::Document(xml) => ([(header::CONTENT_TYPE, "text/xml")], xml).into_response(),
            // couldn't parse it so we don't claim to know what it is
            GuideOutput::Passthrough(raw) => raw.into_response(),
        };

        Ok(response)
    }
}
