//! Builder for `ServiceConfig`
//!
//! Every field has a default, so the builder has no required steps; `build()`
//! validates the combination.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use super::types::{ConfigError, ServiceConfig};
use crate::utils::{
    DEFAULT_BIND_ADDR, DEFAULT_DETECT_CONCURRENCY, DEFAULT_DETECT_TIMEOUT_MS,
    DEFAULT_FETCH_CONCURRENCY, DEFAULT_FETCH_RETRIES, DEFAULT_FETCH_TIMEOUT_MS,
    DEFAULT_MAX_RUNNING_JOBS, DEFAULT_MIN_IMAGE_WIDTH, DEFAULT_PRIORITY_DELAY_MS,
    DEFAULT_RELATED_TOPIC_LIMIT, DEFAULT_RETRY_DELAY_MS, DEFAULT_STATIC_DIR,
    DEFAULT_VISION_ENDPOINT, DEFAULT_WIKI_API_BASE,
};

#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    pub(crate) bind_addr: String,
    pub(crate) max_running_jobs: usize,
    pub(crate) fetch_concurrency: usize,
    pub(crate) detect_concurrency: usize,
    pub(crate) fetch_retries: u32,
    pub(crate) retry_delay_ms: u64,
    pub(crate) fetch_timeout_ms: u64,
    pub(crate) detect_timeout_ms: u64,
    pub(crate) priority_delay_ms: u64,
    pub(crate) related_topic_limit: usize,
    pub(crate) min_image_width: u32,
    pub(crate) wiki_api_base: String,
    pub(crate) vision_endpoint: String,
    pub(crate) vision_api_key: Option<String>,
    pub(crate) static_dir: PathBuf,
    pub(crate) finished_job_retention_secs: Option<u64>,
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_running_jobs: DEFAULT_MAX_RUNNING_JOBS,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            detect_concurrency: DEFAULT_DETECT_CONCURRENCY,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            detect_timeout_ms: DEFAULT_DETECT_TIMEOUT_MS,
            priority_delay_ms: DEFAULT_PRIORITY_DELAY_MS,
            related_topic_limit: DEFAULT_RELATED_TOPIC_LIMIT,
            min_image_width: DEFAULT_MIN_IMAGE_WIDTH,
            wiki_api_base: DEFAULT_WIKI_API_BASE.to_string(),
            vision_endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            vision_api_key: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            finished_job_retention_secs: None,
        }
    }
}

impl ServiceConfig {
    /// Create a builder preloaded with the defaults
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfigBuilder::default()
            .build()
            .expect("BUG: hardcoded default configuration is invalid")
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn at_least_one(field: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCapacity { field })
    } else {
        Ok(value)
    }
}

impl ServiceConfigBuilder {
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn max_running_jobs(mut self, max: usize) -> Self {
        self.max_running_jobs = max;
        self
    }

    pub fn fetch_concurrency(mut self, slots: usize) -> Self {
        self.fetch_concurrency = slots;
        self
    }

    pub fn detect_concurrency(mut self, slots: usize) -> Self {
        self.detect_concurrency = slots;
        self
    }

    /// Retries after the first attempt; `0` disables retrying
    pub fn fetch_retries(mut self, retries: u32) -> Self {
        self.fetch_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = millis(delay);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = millis(timeout);
        self
    }

    pub fn detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout_ms = millis(timeout);
        self
    }

    pub fn priority_delay(mut self, delay: Duration) -> Self {
        self.priority_delay_ms = millis(delay);
        self
    }

    pub fn related_topic_limit(mut self, limit: usize) -> Self {
        self.related_topic_limit = limit;
        self
    }

    pub fn min_image_width(mut self, width: u32) -> Self {
        self.min_image_width = width;
        self
    }

    pub fn wiki_api_base(mut self, url: impl Into<String>) -> Self {
        self.wiki_api_base = url.into();
        self
    }

    pub fn vision_endpoint(mut self, url: impl Into<String>) -> Self {
        self.vision_endpoint = url.into();
        self
    }

    pub fn vision_api_key(mut self, key: Option<String>) -> Self {
        self.vision_api_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Drop terminal jobs nobody polled after `retention`; `None` disables
    pub fn finished_job_retention(mut self, retention: Option<Duration>) -> Self {
        self.finished_job_retention_secs = retention.map(|r| r.as_secs().max(1));
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Fails when a pool or cap is zero, the bind address does not parse, or
    /// either API URL is invalid.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let bind_addr =
            self.bind_addr
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidBindAddr {
                    value: self.bind_addr.clone(),
                    reason: e.to_string(),
                })?;

        Ok(ServiceConfig {
            bind_addr,
            max_running_jobs: at_least_one("max_running_jobs", self.max_running_jobs)?,
            fetch_concurrency: at_least_one("fetch_concurrency", self.fetch_concurrency)?,
            detect_concurrency: at_least_one("detect_concurrency", self.detect_concurrency)?,
            fetch_retries: self.fetch_retries,
            retry_delay_ms: self.retry_delay_ms,
            fetch_timeout_ms: self.fetch_timeout_ms,
            detect_timeout_ms: self.detect_timeout_ms,
            priority_delay_ms: self.priority_delay_ms,
            related_topic_limit: self.related_topic_limit,
            min_image_width: self.min_image_width,
            wiki_api_base: parse_url("wiki_api_base", &self.wiki_api_base)?,
            vision_endpoint: parse_url("vision_endpoint", &self.vision_endpoint)?,
            vision_api_key: self.vision_api_key,
            static_dir: self.static_dir,
            finished_job_retention_secs: self.finished_job_retention_secs,
        })
    }
}
