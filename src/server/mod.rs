pub mod api;
pub mod dtos;
pub mod error;
pub mod services;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{Extension, Router, ServiceExt, extract::Request};
use once_cell::sync::Lazy;
use tower::Layer;
use tower_http::{normalize_path::NormalizePathLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::AppConfig,
    database::{DynCacheRepository, RedisDatabase},
};

use api::{
    channel_controller::ChannelController, guide_controller::GuideController,
    health_controller::HealthController, ruv_controller::RuvController,
};
use services::edge_services::EdgeServices;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub struct EdgeApplicationServer;

impl EdgeApplicationServer {
    /// /c playlist, /c/{chan} stream redirect, /ruv/{chan} geoblock redirect, /g guide
    pub fn router(services: EdgeServices) -> Router {
        Router::new()
            .nest("/c", ChannelController::app())
            .nest("/ruv", RuvController::app())
            .nest("/g", GuideController::app())
            .merge(HealthController::app())
            .layer(Extension(services))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(
        config: Arc<AppConfig>,
        cache: DynCacheRepository,
        redis: Option<Arc<RedisDatabase>>,
    ) -> anyhow::Result<()> {
        // touch it so uptime counts from startup and not the first health check
        Lazy::force(&START_TIME);

        let services = EdgeServices::new(config.clone(), cache, redis)?;

        let app = NormalizePathLayer::trim_trailing_slash().layer(Self::router(services));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        info!("listening on {}", addr);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("edge server exited with an error")?;

        info!("Shutting down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
