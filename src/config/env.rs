//! Environment overrides
//!
//! Each field can be set through `TOPIC_FACES_<FIELD>` (upper case). Durations
//! are given in milliseconds, except the retention which is in seconds.

use std::str::FromStr;
use std::time::Duration;

use super::builder::ServiceConfigBuilder;
use super::types::{ConfigError, ServiceConfig};
use crate::utils::ENV_PREFIX;

/// Prefixed variable lookup; unset or blank means "keep the default"
struct Overrides<F> {
    lookup: F,
}

impl<F> Overrides<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, name: &str) -> Option<(String, String)> {
        let key = format!("{ENV_PREFIX}{name}");
        (self.lookup)(&key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| (key, v.trim().to_string()))
    }

    fn text(&self, name: &str) -> Option<String> {
        self.raw(name).map(|(_, value)| value)
    }

    fn parsed<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some((key, value)) = self.raw(name) else {
            return Ok(None);
        };
        value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnv {
                var: key,
                value,
                reason: e.to_string(),
            })
    }

    fn millis(&self, name: &str) -> Result<Option<Duration>, ConfigError> {
        Ok(self.parsed::<u64>(name)?.map(Duration::from_millis))
    }
}

impl ServiceConfigBuilder {
    /// Apply every `TOPIC_FACES_*` variable set in the process environment
    ///
    /// # Errors
    /// Fails on the first variable whose value does not parse.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `TOPIC_FACES_*` overrides read through `lookup`
    ///
    /// `lookup` receives the full variable name.
    ///
    /// # Errors
    /// Fails on the first variable whose value does not parse.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Overrides { lookup };

        if let Some(addr) = env.text("BIND_ADDR") {
            self = self.bind_addr(addr);
        }
        if let Some(n) = env.parsed("MAX_RUNNING_JOBS")? {
            self = self.max_running_jobs(n);
        }
        if let Some(n) = env.parsed("FETCH_CONCURRENCY")? {
            self = self.fetch_concurrency(n);
        }
        if let Some(n) = env.parsed("DETECT_CONCURRENCY")? {
            self = self.detect_concurrency(n);
        }
        if let Some(n) = env.parsed("FETCH_RETRIES")? {
            self = self.fetch_retries(n);
        }
        if let Some(d) = env.millis("RETRY_DELAY_MS")? {
            self = self.retry_delay(d);
        }
        if let Some(d) = env.millis("FETCH_TIMEOUT_MS")? {
            self = self.fetch_timeout(d);
        }
        if let Some(d) = env.millis("DETECT_TIMEOUT_MS")? {
            self = self.detect_timeout(d);
        }
        if let Some(d) = env.millis("PRIORITY_DELAY_MS")? {
            self = self.priority_delay(d);
        }
        if let Some(n) = env.parsed("RELATED_TOPIC_LIMIT")? {
            self = self.related_topic_limit(n);
        }
        if let Some(n) = env.parsed("MIN_IMAGE_WIDTH")? {
            self = self.min_image_width(n);
        }
        if let Some(url) = env.text("WIKI_API_BASE") {
            self = self.wiki_api_base(url);
        }
        if let Some(url) = env.text("VISION_ENDPOINT") {
            self = self.vision_endpoint(url);
        }
        if let Some(key) = env.text("VISION_API_KEY") {
            self = self.vision_api_key(Some(key));
        }
        if let Some(dir) = env.text("STATIC_DIR") {
            self = self.static_dir(dir);
        }
        if let Some(secs) = env.parsed::<u64>("FINISHED_JOB_RETENTION_SECS")? {
            self = self.finished_job_retention(Some(Duration::from_secs(secs)));
        }
        Ok(self)
    }
}

impl ServiceConfig {
    /// Defaults overridden by the process environment
    ///
    /// # Errors
    /// Fails when a variable does not parse or the result does not validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().with_env_overrides()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), (*v).to_string()))
            .collect();
        ServiceConfig::builder()
            .with_overrides_from(|key| vars.get(key).cloned())?
            .build()
    }

    #[test]
    fn test_every_variable_is_applied() {
        let config = from_vars(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("MAX_RUNNING_JOBS", "7"),
            ("FETCH_CONCURRENCY", "2"),
            ("DETECT_CONCURRENCY", "3"),
            ("FETCH_RETRIES", "0"),
            ("RETRY_DELAY_MS", "250"),
            ("FETCH_TIMEOUT_MS", "1500"),
            ("DETECT_TIMEOUT_MS", "2500"),
            ("PRIORITY_DELAY_MS", "40"),
            ("RELATED_TOPIC_LIMIT", "4"),
            ("MIN_IMAGE_WIDTH", "150"),
            ("WIKI_API_BASE", "https://de.wikipedia.org/w/api.php"),
            ("VISION_ENDPOINT", "http://localhost:9999/annotate"),
            ("VISION_API_KEY", "secret"),
            ("STATIC_DIR", "/srv/frontend"),
            ("FINISHED_JOB_RETENTION_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.max_running_jobs(), 7);
        assert_eq!(config.fetch_concurrency(), 2);
        assert_eq!(config.detect_concurrency(), 3);
        assert_eq!(config.fetch_retries(), 0);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.fetch_timeout(), Duration::from_millis(1500));
        assert_eq!(config.detect_timeout(), Duration::from_millis(2500));
        assert_eq!(config.priority_delay(), Duration::from_millis(40));
        assert_eq!(config.related_topic_limit(), 4);
        assert_eq!(config.min_image_width(), 150);
        assert_eq!(config.wiki_api_base().host_str(), Some("de.wikipedia.org"));
        assert_eq!(config.vision_endpoint().port(), Some(9999));
        assert_eq!(config.vision_api_key(), Some("secret"));
        assert_eq!(config.static_dir(), std::path::Path::new("/srv/frontend"));
        assert_eq!(config.finished_job_retention(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = from_vars(&[("MAX_RUNNING_JOBS", "  "), ("VISION_API_KEY", "")]).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_unparsable_number_names_the_variable() {
        let err = from_vars(&[("FETCH_RETRIES", "three")]).unwrap_err();
        match err {
            ConfigError::InvalidEnv { var, value, .. } => {
                assert_eq!(var, "TOPIC_FACES_FETCH_RETRIES");
                assert_eq!(value, "three");
            }
            other => panic!("expected InvalidEnv, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides_still_validated() {
        assert!(matches!(
            from_vars(&[("DETECT_CONCURRENCY", "0")]),
            Err(ConfigError::ZeroCapacity { field: "detect_concurrency" })
        ));
    }
}
