use crate::error::Result;
use crate::result::FetchResult;
use crate::source::PageSource;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Browser identities rotated across requests.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36",
];

/// Statuses worth another attempt; anything else non-2xx fails at once.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const MAX_BACKOFF: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout, also used as the connect timeout.
    pub timeout: Duration,
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Wait before retry `n` is `backoff_factor * 2^n` seconds.
    pub backoff_factor: f64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            retries: 3,
            backoff_factor: 0.3,
        }
    }
}

enum Attempt {
    Done(FetchResult),
    Retry {
        reason: String,
        retry_after: Option<Duration>,
    },
}

/// HTTP GET client with retries and a rotating `User-Agent`.
///
/// Every failure collapses into [`FetchResult::Unavailable`]; callers only
/// learn *that* a page could not be fetched, never why.
pub struct FetchClient {
    client: Client,
    rng: StdRng,
    retries: u32,
    backoff_factor: f64,
}

impl FetchClient {
    pub fn new(options: FetchOptions) -> Result<Self> {
        Self::with_rng(options, StdRng::from_os_rng())
    }

    /// Build a client whose identity rotation is driven by `rng`, so a seeded
    /// run picks the same user agents every time.
    pub fn with_rng(options: FetchOptions, rng: StdRng) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            rng,
            retries: options.retries,
            backoff_factor: options.backoff_factor,
        })
    }

    /// GET `url`, retrying transport failures and [`RETRY_STATUSES`].
    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        let user_agent = self.pick_user_agent();
        let mut attempt = 0u32;

        loop {
            match self.attempt(url, user_agent).await {
                Attempt::Done(result) => return result,
                Attempt::Retry {
                    reason,
                    retry_after,
                } => {
                    if attempt >= self.retries {
                        debug!("Giving up on {} after {} retries: {}", url, attempt, reason);
                        return FetchResult::Unavailable;
                    }

                    let delay = retry_after
                        .unwrap_or_else(|| backoff_delay(self.backoff_factor, attempt))
                        .min(MAX_BACKOFF);
                    warn!(
                        url,
                        attempt,
                        max_retries = self.retries,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "transient fetch error, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn pick_user_agent(&mut self) -> &'static str {
        USER_AGENTS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    async fn attempt(&self, url: &str, user_agent: &str) -> Attempt {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if is_transient(&e) => {
                return Attempt::Retry {
                    reason: e.to_string(),
                    retry_after: None,
                };
            }
            Err(e) => {
                debug!("Request failed for {}: {}", url, e);
                return Attempt::Done(FetchResult::Unavailable);
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.text().await {
                Ok(body) => Attempt::Done(FetchResult::Fetched {
                    status_code: status.as_u16(),
                    body,
                }),
                Err(e) => Attempt::Retry {
                    reason: format!("failed to read body: {}", e),
                    retry_after: None,
                },
            };
        }

        if is_retryable_status(status) {
            Attempt::Retry {
                reason: format!("HTTP {}", status.as_u16()),
                retry_after: parse_retry_after(response.headers()),
            }
        } else {
            debug!("Request failed for {}: HTTP {}", url, status.as_u16());
            Attempt::Done(FetchResult::Unavailable)
        }
    }
}

impl PageSource for FetchClient {
    async fn fetch(&mut self, url: &str) -> FetchResult {
        FetchClient::fetch(self, url).await
    }
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}

// Builder and redirect-policy errors fail the same way every time.
fn is_transient(err: &reqwest::Error) -> bool {
    !err.is_builder() && !err.is_redirect()
}

fn backoff_delay(factor: f64, attempt: u32) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = factor.max(0.0) * 2f64.powi(exponent);
    Duration::try_from_secs_f64(secs).unwrap_or(MAX_BACKOFF)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
