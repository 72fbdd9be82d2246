use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::{
    config::AppConfig,
    database::{AUTH_HASH_KEY, DynCacheRepository, auth::AuthResponse, spawn_cache_value},
};

use super::fetch_services::DynFetchService;

pub type DynAuthService = Arc<dyn AuthServiceTrait + Send + Sync>;

#[mockall::automock]
#[async_trait::async_trait]
pub trait AuthServiceTrait {
    /// signed hash for stream redirects, `None` when upstream wouldn't give us one
    async fn resolve_auth_token(&self) -> Option<String>;
}

pub struct AuthService {
    cache: DynCacheRepository,
    fetcher: DynFetchService,
    auth_url: String,
    username: String,
    password: String,
    site: String,
}

impl AuthService {
    pub fn new(cache: DynCacheRepository, fetcher: DynFetchService, config: &AppConfig) -> Self {
        Self {
            cache,
            fetcher,
            auth_url: config.auth_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            site: config.auth_site.clone(),
        }
    }

    fn credentials(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
            ("site".to_string(), self.site.clone()),
        ]
    }
}

#[async_trait::async_trait]
impl AuthServiceTrait for AuthService {
    async fn resolve_auth_token(&self) -> Option<String> {
        if let Some(hash) = self.cache.get(AUTH_HASH_KEY).await.filter(|h| !h.is_empty()) {
            info!("Got auth from cache");
            return Some(hash);
        }

        let body = self
            .fetcher
            .post_form(&self.auth_url, self.credentials())
            .await?;

        let auth: AuthResponse = match serde_json::from_str(&body) {
            Ok(auth) => auth,
            Err(e) => {
                warn!("Could not decode auth response: {}", e);
                return None;
            }
        };

        // a rejection is upstream telling us no, not something broken on our end
        if !auth.is_success() {
            info!("Auth Code: {}. Error: {}", auth.status_code, auth.error);
            return None;
        }

        // the hash goes back right away, the cache write finishes whenever it finishes
        let ttl = Duration::from_secs((auth.valid_minutes.max(0) as u64).saturating_mul(60));
        spawn_cache_value(self.cache.clone(), AUTH_HASH_KEY, auth.hash.clone(), ttl);

        Some(auth.hash)
    }
}
