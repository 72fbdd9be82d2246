use std::sync::Arc;
use std::time::Duration;

use mockall::automock;
use tracing::{debug, error, info};

/// every upstream get gets this long before it's given up on
pub const FETCH_TIMEOUT_SECS: u64 = 15;

pub type DynFetchService = Arc<dyn FetchServiceTrait + Send + Sync>;

/// the one place upstream http failures get swallowed. Nothing in here ever errors, a failure is
/// logged once and comes back as `None`, which every caller has to treat as a normal outcome
#[automock]
#[async_trait::async_trait]
pub trait FetchServiceTrait {
    /// GET `url` and hand back the body, only 2xx counts
    async fn fetch(&self, url: &str) -> Option<String>;

    /// form encoded POST, same rules as [`FetchServiceTrait::fetch`]
    async fn post_form(&self, url: &str, form: Vec<(String, String)>) -> Option<String>;
}

pub struct FetchService {
    http_client: reqwest::Client,
}

impl FetchService {
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http_client }
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn read_body(response: reqwest::Response, url: &str) -> Option<String> {
        let status = response.status();
        info!("Received status {} for {}", status, url);

        if !status.is_success() {
            error!("Upstream returned {} for {}", status, url);
            return None;
        }

        match response.text().await {
            Ok(body) => {
                debug!("Read {} bytes from {}", body.len(), url);
                Some(body)
            }
            Err(e) => {
                error!("Error reading body from {}: {}", url, e);
                None
            }
        }
    }
}

impl Default for FetchService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FetchServiceTrait for FetchService {
    async fn fetch(&self, url: &str) -> Option<String> {
        info!("Getting url: '{}'", url);

        match self.http_client.get(url).send().await {
            Ok(response) => Self::read_body(response, url).await,
            Err(e) => {
                error!("Error in http get for {}: {}", url, e);
                None
            }
        }
    }

    async fn post_form(&self, url: &str, form: Vec<(String, String)>) -> Option<String> {
        info!("Posting form to: '{}'", url);

        match self.http_client.post(url).form(&form).send().await {
            Ok(response) => Self::read_body(response, url).await,
            Err(e) => {
                error!("Error in http post for {}: {}", url, e);
                None
            }
        }
    }
}
