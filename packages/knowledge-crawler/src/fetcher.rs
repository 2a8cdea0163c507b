//! HTTP fetching with per-host politeness.

use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::{FetchError, FetchResult};
use crate::normalize;

type HostLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// A fetched HTTP response body with its transport metadata.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    /// URL after redirects; link resolution uses this as the base
    pub final_url: Url,
}

impl FetchedPage {
    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Network access seam. The crawler only ever talks to this trait, so tests
/// substitute a mock without touching the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage>;
}

/// Reqwest-backed fetcher enforcing scope, politeness and a fixed timeout.
///
/// Politeness is a keyed rate limit: one quota per host, so a slow wait on
/// one host never delays fetches from another.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    scope_host: Option<String>,
    limiter: Option<HostLimiter>,
}

impl HttpFetcher {
    /// Build a fetcher from crawler configuration.
    pub fn new(config: &CrawlerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");

        let limiter = Quota::with_period(Duration::from_millis(config.politeness_delay_ms))
            .map(RateLimiter::keyed);

        Self {
            client,
            user_agent: config.user_agent.clone(),
            scope_host: None,
            limiter,
        }
    }

    /// Restrict fetches to a seed host and its subdomains.
    pub fn with_scope(mut self, seed_host: impl Into<String>) -> Self {
        self.scope_host = Some(seed_host.into().to_lowercase());
        self
    }

    fn check_scope(&self, url: &Url) -> FetchResult<()> {
        let Some(seed_host) = &self.scope_host else {
            return Ok(());
        };
        let host = url.host_str().unwrap_or("");
        if normalize::in_scope(host, seed_host) {
            Ok(())
        } else {
            Err(FetchError::OffSite {
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<FetchedPage> {
        self.check_scope(url)?;

        if let (Some(limiter), Some(host)) = (&self.limiter, url.host_str()) {
            limiter.until_key_ready(&host.to_lowercase()).await;
        }

        tracing::debug!(url = %url, "Fetching");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Connection {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .to_vec();

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Fetched"
        );

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
            content_type,
            final_url,
        })
    }
}
