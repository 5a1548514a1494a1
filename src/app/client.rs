//! HTTP retrieval service for Google Drive
//!
//! This module implements the retrieval service contract: fetch the
//! canonical download address with rate limiting and bounded retries, then
//! classify the terminal response as delivered bytes or a denial. Drive
//! answers requests for access-restricted files with an interstitial HTML
//! page under a success status, so classification looks at the content type
//! as well as the status code.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use crate::app::naming;
use crate::constants::{http, limits};
use crate::errors::{DownloadError, DownloadResult};

/// Why the service refused to hand over file bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Upstream answered with a non-success status
    Status,
    /// Upstream answered 2xx but served an interstitial access page
    InterstitialPage,
}

/// Terminal classification of one service fetch
#[derive(Debug)]
pub enum ServiceOutcome {
    /// File bytes were served; `disposition` carries the header-contract
    /// filename proposal (extension-corrected, control-stripped,
    /// percent-encoded)
    Delivered {
        payload: Vec<u8>,
        content_type: Option<String>,
        disposition: String,
    },
    /// Upstream refused or cannot serve the bytes directly; no usable payload
    Denied { status: u16, reason: DenialReason },
}

/// Retrieval service contract consumed by the retrieval strategy
#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// Fetch a retrieval target, classifying the result.
    ///
    /// Denial is a normal outcome and comes back as `Ok(Denied)`; `Err` is
    /// reserved for transport faults that survived the retry budget and for
    /// malformed targets.
    async fn fetch(&self, target: &str, proposed_name: &str) -> DownloadResult<ServiceOutcome>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub request_timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    /// User agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            max_redirects: http::MAX_REDIRECTS,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Build the underlying reqwest client from this configuration
    pub fn build_http_client(&self) -> DownloadResult<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(self.max_redirects))
            .build()?;
        Ok(client)
    }
}

/// Drive retrieval client with rate limiting and retry logic
pub struct DriveClient {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl DriveClient {
    /// Create a client with default configuration
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: &ClientConfig) -> DownloadResult<Self> {
        let client = config.build_http_client()?;
        let rate_limiter = Self::build_rate_limiter(config.rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> DownloadResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit_rps).ok_or_else(|| {
            DownloadError::Other("Rate limit must be non-zero".to_string())
        })?);
        Ok(RateLimiter::direct(quota))
    }

    /// Fetch a URL with rate limiting and retry on transport faults and
    /// server pushback (429/503)
    async fn get_response(&self, url: &Url) -> DownloadResult<reqwest::Response> {
        // Jitter avoids synchronizing with other clients on the same host
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let mut retries = 0;
        loop {
            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    if response.status() == 429 {
                        if retries < limits::MAX_RETRIES {
                            retries += 1;
                            let delay = Duration::from_millis(
                                limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries),
                            );
                            tracing::warn!(
                                "Rate limited by server (429). Backing off for {}ms",
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        } else {
                            return Err(DownloadError::RateLimitExceeded);
                        }
                    }

                    if response.status() == 503 {
                        if retries < limits::MAX_RETRIES {
                            retries += 1;
                            let delay = Duration::from_millis(
                                limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries),
                            );
                            tracing::warn!(
                                "Server overloaded (503). Backing off for {}ms",
                                delay.as_millis()
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        } else {
                            return Err(DownloadError::ServerOverloaded);
                        }
                    }

                    tracing::debug!("Fetched response: {}", url);
                    return Ok(response);
                }
                Err(e) if retries < limits::MAX_RETRIES => {
                    retries += 1;
                    let delay =
                        Duration::from_millis(limits::RETRY_BASE_DELAY_MS * 2_u64.pow(retries));
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {}ms",
                        retries,
                        limits::MAX_RETRIES,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!("Request failed after {} retries: {}", limits::MAX_RETRIES, e);
                    return Err(DownloadError::MaxRetriesExceeded {
                        max_retries: limits::MAX_RETRIES,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl RetrievalService for DriveClient {
    async fn fetch(&self, target: &str, proposed_name: &str) -> DownloadResult<ServiceOutcome> {
        let url = Url::parse(target).map_err(|e| DownloadError::InvalidUrl {
            url: target.to_string(),
            error: e.to_string(),
        })?;

        let response = self.get_response(&url).await?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!("Denied by status {} for {}", status, target);
            return Ok(ServiceOutcome::Denied {
                status: status.as_u16(),
                reason: DenialReason::Status,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        // A success status serving HTML is Drive's access page, not the file
        if let Some(ref ct) = content_type {
            if naming::is_interstitial(ct) {
                tracing::debug!("Denied by interstitial page for {}", target);
                return Ok(ServiceOutcome::Denied {
                    status: status.as_u16(),
                    reason: DenialReason::InterstitialPage,
                });
            }
        }

        let payload = response.bytes().await?.to_vec();

        let corrected = naming::apply_extension(proposed_name, content_type.as_deref());
        let disposition = naming::content_disposition(&naming::strip_control(&corrected));

        tracing::debug!(
            "Delivered {} bytes for {} as {:?}",
            payload.len(),
            target,
            corrected
        );

        Ok(ServiceOutcome::Delivered {
            payload,
            content_type,
            disposition,
        })
    }
}
