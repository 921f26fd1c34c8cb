//! Retrying fetcher
//!
//! Each attempt is a small state machine: `attempting -> succeeded | retrying
//! | exhausted`. A limiter slot is held for exactly one attempt and released
//! before the backoff delay, so the limiter bounds in-flight attempts rather
//! than logical requests.

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::errors::FetchError;
use super::source::ContentSource;
use crate::concurrency::ConcurrencyLimiter;
use crate::utils::{DEFAULT_FETCH_RETRIES, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS};

/// Fixed-count, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_FETCH_RETRIES,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// Where an attempt left the fetch
enum AttemptOutcome {
    Succeeded(String),
    Retrying(FetchError),
    Exhausted(FetchError),
}

/// Wraps a `ContentSource` with limiter admission and retries
#[derive(Clone)]
pub struct RetryingFetcher {
    source: Arc<dyn ContentSource>,
    limiter: ConcurrencyLimiter,
    policy: RetryPolicy,
    timeout: Duration,
}

impl RetryingFetcher {
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>, limiter: ConcurrencyLimiter) -> Self {
        Self {
            source,
            limiter,
            policy: RetryPolicy::default(),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-call timeout passed through to the content source
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    /// Fetch `url`, retrying transient failures
    ///
    /// # Errors
    /// Returns `FetchError::Exhausted` wrapping the last failure once the
    /// retry budget is spent.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            match self.attempt(url, attempt).await {
                AttemptOutcome::Succeeded(body) => {
                    if attempt > 0 {
                        debug!("Fetched {url} after {} attempts", attempt + 1);
                    }
                    return Ok(body);
                }
                AttemptOutcome::Retrying(error) => {
                    warn!(
                        "Error fetching {url}: {error}. Retrying ({} retries left)",
                        self.policy.max_retries - attempt
                    );
                    tokio::time::sleep(self.policy.delay).await;
                    attempt += 1;
                }
                AttemptOutcome::Exhausted(error) => {
                    warn!("Giving up on {url} after {} attempts: {error}", attempt + 1);
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts: attempt + 1,
                        last: Box::new(error),
                    });
                }
            }
        }
    }

    async fn attempt(&self, url: &str, attempt: u32) -> AttemptOutcome {
        let result = {
            let _slot = self.limiter.acquire().await;
            self.source.fetch(url, self.timeout).await
        };

        match result {
            Ok(body) => AttemptOutcome::Succeeded(body),
            Err(error) if attempt < self.policy.max_retries => AttemptOutcome::Retrying(error),
            Err(error) => AttemptOutcome::Exhausted(error),
        }
    }
}
