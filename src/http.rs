//! HTTP fetching with exponential backoff retry logic.
//!
//! Every source adapter goes through [`HttpClient`], which wraps a shared
//! `reqwest` client and retries transient failures (transport errors, HTTP
//! 429 and 5xx) through [`Backoff`].
//!
//! # Retry Strategy
//!
//! - Configurable number of retries (3 by default)
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//!
//! Non-transient failures such as 403 or 404 are returned immediately.

use crate::config::HttpSettings;
use crate::error::FetchError;
use crate::utils::truncate_for_log;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Exponential backoff policy applied around a fallible async operation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
#[derive(Clone, Copy)]
pub struct Backoff {
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl Backoff {
    pub fn new(max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        self.base_delay.saturating_mul(1 << shift).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or
    /// exhausts the retry budget.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !e.is_transient() || attempt > self.max_retries {
                        error!(
                            label,
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "request failed; not retrying"
                        );
                        return Err(e);
                    }

                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = self.delay_for(attempt) + StdDuration::from_millis(jitter_ms);

                    warn!(
                        label,
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "request attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backoff")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

/// Shared HTTP client used by all live source adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    backoff: Backoff,
}

impl HttpClient {
    /// Build a client with the configured timeout and a user agent picked
    /// at random from the configured pool.
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, FetchError> {
        let user_agent = settings
            .user_agents
            .choose(&mut rng())
            .cloned()
            .unwrap_or_else(|| concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string());
        debug!(%user_agent, timeout_secs = settings.timeout_secs, "Building HTTP client");

        let inner = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(StdDuration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            inner,
            backoff: Backoff::new(settings.max_retries, StdDuration::from_secs(1)),
        })
    }

    /// GET a URL and return the body as text, retrying transient failures.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        self.backoff
            .run(url.as_str(), move || async move {
                let response = self.inner.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response.text().await?)
            })
            .await
    }

    /// GET a URL and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(%url, error = %e, body_preview = %truncate_for_log(&body, 300), "Response is not the expected JSON");
            FetchError::Decode(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick() -> Backoff {
        Backoff::new(3, StdDuration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let backoff = Backoff::new(10, StdDuration::from_secs(1));
        assert_eq!(backoff.delay_for(1), StdDuration::from_secs(1));
        assert_eq!(backoff.delay_for(2), StdDuration::from_secs(2));
        assert_eq!(backoff.delay_for(3), StdDuration::from_secs(4));
        assert_eq!(backoff.delay_for(8), StdDuration::from_secs(30));
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = quick()
            .run("test", move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError::Status {
                        status: 503,
                        url: "https://example.com".to_string(),
                    })
                } else {
                    Ok(n)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_client_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = quick()
            .run("test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Status {
                    status: 403,
                    url: "https://example.com".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(FetchError::Status { status: 403, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<(), _> = quick()
            .run("test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Status {
                    status: 429,
                    url: "https://example.com".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_client_builds_from_default_settings() {
        let client = HttpClient::from_settings(&HttpSettings::default());
        assert!(client.is_ok());
    }
}
