use crate::config::CrawlConfig;
use crate::error::{FetchError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

/// A fetched body and the URL it was finally served from, after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// A single-URL HTTP GET with a per-request timeout and fixed-delay retries.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.timeout / 2)
            .pool_max_idle_per_host(config.workers.max(1))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: config.backoff,
        })
    }

    /// Fetch `url`, retrying anything except a 404 up to `max_retries`
    /// attempts in total, sleeping `backoff` between attempts.
    pub async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let attempts = self.max_retries.max(1);
        let mut last = String::new();

        for attempt in 1..=attempts {
            match self.attempt(url).await {
                Ok(page) => return Ok(page),
                Err(FetchError::NotFound(url)) => {
                    warn!("URL not found (404): {}", url);
                    return Err(FetchError::NotFound(url));
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed for {}: {}", attempt, attempts, url, e);
                    last = match e {
                        FetchError::Transient { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!("Failed to fetch {} after {} attempts", url, attempts);
        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last,
        })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        debug!("GET {}", url);
        let transient = |reason: String| FetchError::Transient {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(transient(format!("HTTP {}", status)));
        }

        if response.url().as_str() != url {
            debug!("{} redirected to {}", url, response.url());
        }
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| transient(e.to_string()))?;
        Ok(FetchedPage {
            url: final_url,
            body,
        })
    }
}
