//! Core configuration types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

/// Errors raised while building or loading a `ServiceConfig`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },

    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("Invalid URL for {field} '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid value for {var} '{value}': {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: String,
    },
}

/// Main configuration struct for the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub(crate) bind_addr: SocketAddr,

    /// Jobs allowed to run at once; further submissions are rejected
    pub(crate) max_running_jobs: usize,

    /// Slots in the content fetch pool, shared by all jobs
    pub(crate) fetch_concurrency: usize,

    /// Slots in the detection pool, shared by all jobs
    pub(crate) detect_concurrency: usize,

    /// Retries after the first failed fetch attempt
    pub(crate) fetch_retries: u32,
    pub(crate) retry_delay_ms: u64,

    /// Per-call timeouts handed to the collaborators
    pub(crate) fetch_timeout_ms: u64,
    pub(crate) detect_timeout_ms: u64,

    /// Head start for primary-topic detection before related topics start
    pub(crate) priority_delay_ms: u64,

    pub(crate) related_topic_limit: usize,

    /// Images must be strictly wider than this to be analysed
    pub(crate) min_image_width: u32,

    pub(crate) wiki_api_base: Url,
    pub(crate) vision_endpoint: Url,

    #[serde(skip_serializing)]
    pub(crate) vision_api_key: Option<String>,

    /// Frontend build served for non-API paths, when it exists
    pub(crate) static_dir: PathBuf,

    /// Terminal jobs nobody polled are dropped after this long.
    /// `None` keeps them until polled.
    pub(crate) finished_job_retention_secs: Option<u64>,
}
