//! reqwest-backed [`FeedSource`] with bounded retry.

use std::time::Duration;

use async_trait::async_trait;
use mw_config::{FeedsConfig, HttpConfig};
use serde_json::Value;

use crate::source::{FeedError, FeedKind, FeedSource};

const USER_AGENT: &str = concat!("mw-reporter/", env!("CARGO_PKG_VERSION"));

/// Fetches both feeds over HTTPS. Every request is bounded by the configured
/// timeout; retryable failures back off `backoff * 2^attempt`.
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    account_totals_url: String,
    trades_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl HttpFeedClient {
    pub fn new(feeds: &FeedsConfig, cfg: &HttpConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Config(e.to_string()))?;
        Ok(Self {
            http,
            account_totals_url: feeds.account_totals_url.clone(),
            trades_url: feeds.trades_url.clone(),
            max_retries: cfg.max_retries,
            backoff: cfg.backoff,
        })
    }

    pub fn url_for(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::AccountTotals => &self.account_totals_url,
            FeedKind::Trades => &self.trades_url,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, FeedError> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                code: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FeedError::Decode(e.to_string()))
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self, kind: FeedKind) -> Result<Value, FeedError> {
        let url = self.url_for(kind);
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        feed = %kind,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "feed fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
