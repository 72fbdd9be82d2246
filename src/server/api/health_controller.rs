use axum::Extension;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use chrono::Utc;
use tracing::error;

use crate::logger::Logger;
use crate::server::dtos::health_dto::{
    CacheBackend, CacheHealth, HealthResponse, HealthStatus, ServiceHealthDetails,
};
use crate::server::services::edge_services::EdgeServices;
use crate::server::{get_app_version, get_uptime_seconds};

pub struct HealthController;

impl HealthController {
    pub fn app() -> Router {
        Router::new()
            .route("/ready", get(Self::ready))
            .route("/health", get(Self::health))
    }

    /// readiness probe, answers as soon as the router is up
    async fn ready() -> (StatusCode, &'static str) {
        (StatusCode::OK, "Ready!")
    }

    /// the cache is only an accelerator so losing redis degrades us instead of taking us down
    async fn health(
        Extension(services): Extension<EdgeServices>,
    ) -> (StatusCode, Json<HealthResponse>) {
        let cache = Self::check_cache(&services).await;

        let status = match cache.status {
            HealthStatus::Healthy => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        };

        let response = HealthResponse {
            status,
            timestamp: Utc::now(),
            uptime_seconds: get_uptime_seconds(),
            version: get_app_version().to_string(),
            environment: Logger::environment_name(services.config.cargo_env).to_string(),
            services: ServiceHealthDetails { cache },
        };

        (StatusCode::OK, Json(response))
    }

    async fn check_cache(services: &EdgeServices) -> CacheHealth {
        let Some(redis) = services.redis.as_ref() else {
            return CacheHealth {
                backend: CacheBackend::Memory,
                status: HealthStatus::Healthy,
                response_time_ms: 0.0,
            };
        };

        match redis.health_check().await {
            Ok(response_time) => CacheHealth {
                backend: CacheBackend::Redis,
                status: HealthStatus::Healthy,
                response_time_ms: response_time,
            },
            Err(e) => {
                error!("Redis health check failed: {}", e);
                CacheHealth {
                    backend: CacheBackend::Redis,
                    status: HealthStatus::Unhealthy,
                    response_time_ms: 0.0,
                }
            }
        }
    }
}
