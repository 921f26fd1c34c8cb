//! Getter methods for `ServiceConfig`

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::types::ServiceConfig;

impl ServiceConfig {
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[must_use]
    pub fn max_running_jobs(&self) -> usize {
        self.max_running_jobs
    }

    #[must_use]
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    #[must_use]
    pub fn detect_concurrency(&self) -> usize {
        self.detect_concurrency
    }

    #[must_use]
    pub fn fetch_retries(&self) -> u32 {
        self.fetch_retries
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[must_use]
    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }

    #[must_use]
    pub fn priority_delay(&self) -> Duration {
        Duration::from_millis(self.priority_delay_ms)
    }

    #[must_use]
    pub fn related_topic_limit(&self) -> usize {
        self.related_topic_limit
    }

    #[must_use]
    pub fn min_image_width(&self) -> u32 {
        self.min_image_width
    }

    #[must_use]
    pub fn wiki_api_base(&self) -> &Url {
        &self.wiki_api_base
    }

    #[must_use]
    pub fn vision_endpoint(&self) -> &Url {
        &self.vision_endpoint
    }

    #[must_use]
    pub fn vision_api_key(&self) -> Option<&str> {
        self.vision_api_key.as_deref()
    }

    #[must_use]
    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    #[must_use]
    pub fn finished_job_retention(&self) -> Option<Duration> {
        self.finished_job_retention_secs.map(Duration::from_secs)
    }
}
