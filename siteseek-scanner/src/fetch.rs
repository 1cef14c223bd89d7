use crate::error::{Result, ScanError};
use crate::url::CanonicalUrl;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "siteseek/0.1 (https://github.com/trapdoorsec/siteseek)";

/// A response handed back by a [`Fetcher`].
///
/// Any status code counts as a successful fetch; only transport-level
/// failures are errors.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub elapsed: Duration,
    /// Where the response came from when redirects led away from the
    /// requested URL.
    pub final_url: Option<CanonicalUrl>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
            elapsed: Duration::ZERO,
            final_url: None,
        }
    }

    pub fn redirected_to(mut self, url: CanonicalUrl) -> Self {
        self.final_url = Some(url);
        self
    }
}

/// Transport used by the crawler to retrieve pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<FetchResponse>;
}

/// [`Fetcher`] backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

#[derive(Debug, Clone)]
pub struct HttpFetcherOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for HttpFetcherOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 5,
        }
    }
}

impl HttpFetcher {
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Self::with_options(HttpFetcherOptions {
            timeout: Duration::from_secs(timeout_secs),
            ..HttpFetcherOptions::default()
        })
    }

    pub fn with_options(options: HttpFetcherOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent)
            .timeout(options.timeout)
            .connect_timeout(options.timeout / 2)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .build()
            .map_err(|e| ScanError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<FetchResponse> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status().as_u16();
        let final_url = CanonicalUrl::from_url(response.url().clone())
            .ok()
            .filter(|landed| landed != url);
        if let Some(ref landed) = final_url {
            debug!("{} redirected to {}", url, landed);
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;
        let elapsed = start.elapsed();

        debug!("Fetched {} ({}) in {:?}", url, status, elapsed);

        Ok(FetchResponse {
            status,
            content_type,
            body,
            elapsed,
            final_url,
        })
    }
}
