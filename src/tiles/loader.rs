use crate::core::constants::DEFAULT_MAX_CONCURRENT_FETCHES;
use crate::BoxError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shared async HTTP client so that connection pools and TLS sessions are
/// reused across tiles and renders.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("staticmap/", env!("CARGO_PKG_VERSION")))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(16)
        .build()
        .expect("failed to build reqwest async client")
});

/// Configuration for tile fetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum concurrent tile downloads within one render
    pub max_concurrent: usize,
    /// Additional attempts after a failed request
    pub max_retries: usize,
    /// Delay between retry attempts
    pub retry_delay_ms: u64,
    /// Per-request timeout
    pub timeout_ms: u64,
    /// Overrides the client's `User-Agent` header; some tile servers reject the default
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
            max_retries: 0,
            retry_delay_ms: 250,
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

/// Configuration presets
impl FetchConfig {
    pub fn low_resource() -> Self {
        Self {
            max_concurrent: 2,
            max_retries: 1,
            retry_delay_ms: 500,
            timeout_ms: 60_000,
            user_agent: None,
        }
    }

    pub fn for_testing() -> Self {
        Self {
            max_concurrent: 4,
            max_retries: 0,
            retry_delay_ms: 10,
            timeout_ms: 2_000,
            user_agent: None,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Concurrency bound, never zero
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

/// Retrieves raw tile bytes for a URL
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// HTTP(S) GET fetcher; any non-2xx status is a failure
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config,
        }
    }

    pub fn with_client(client: reqwest::Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError> {
        let mut request = self.client.get(url).timeout(self.config.timeout());
        if let Some(agent) = &self.config.user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent.as_str());
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(format!("HTTP {} for {}", response.status(), url).into());
        }

        let data = response.bytes().await?.to_vec();
        if data.is_empty() {
            return Err(format!("empty response body for {}", url).into());
        }
        Ok(data)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

#[async_trait]
impl TileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError> {
        let attempts = self.config.max_retries + 1;
        let mut attempt = 1;
        loop {
            log::debug!("fetch {} attempt {}", url, attempt);
            match self.fetch_once(url).await {
                Ok(data) => {
                    log::info!("downloaded {} ({} bytes)", url, data.len());
                    return Ok(data);
                }
                Err(e) if attempt < attempts => {
                    log::warn!("download of {} failed on attempt {}: {}", url, attempt, e);
                    tokio::time::sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("giving up on {} after {} attempt(s): {}", url, attempt, e);
                    return Err(e);
                }
            }
        }
    }
}
