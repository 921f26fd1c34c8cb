//! Shared configuration constants for the analysis service
//!
//! Default values used by `ServiceConfig` and the collaborators, kept in one
//! place so the limits that shape concurrency are easy to find.

/// Maximum number of jobs whose pipelines may run at the same time
///
/// Submissions beyond this are rejected with a saturation error instead of
/// being queued, so a burst of requests cannot pile up unbounded work.
pub const DEFAULT_MAX_RUNNING_JOBS: usize = 5;

/// Concurrent page fetches against the content source (shared by all jobs)
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// Concurrent detector calls (shared by all jobs)
pub const DEFAULT_DETECT_CONCURRENCY: usize = 5;

/// Retries after the first failed fetch attempt
pub const DEFAULT_FETCH_RETRIES: u32 = 3;

/// Fixed delay between fetch attempts, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Per-call timeout handed to the content source, in milliseconds
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3_000;

/// Per-call timeout handed to the detector, in milliseconds
pub const DEFAULT_DETECT_TIMEOUT_MS: u64 = 5_000;

/// Head start given to the primary topic's detection calls, in milliseconds
///
/// Related-topic discovery waits this long after primary detection has been
/// started so the primary images take the first detection slots.
pub const DEFAULT_PRIORITY_DELAY_MS: u64 = 20;

/// Upper bound on related topics expanded per job
pub const DEFAULT_RELATED_TOPIC_LIMIT: usize = 10;

/// Images must be strictly wider than this (in pixels) to be analysed
///
/// Filters out icons, flags and other decoration that never contain faces.
pub const DEFAULT_MIN_IMAGE_WIDTH: u32 = 100;

/// Default listen address for the HTTP API
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// MediaWiki API endpoint used for topic pages and link lists
pub const DEFAULT_WIKI_API_BASE: &str = "https://en.wikipedia.org/w/api.php";

/// Cloud Vision annotate endpoint used for face detection
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Directory holding the built frontend, served for non-API paths
pub const DEFAULT_STATIC_DIR: &str = "frontend/build";

/// User agent sent with content source requests
///
/// Wikimedia rejects anonymous clients without a descriptive agent.
pub const USER_AGENT: &str = concat!(
    "topic-faces/",
    env!("CARGO_PKG_VERSION"),
    " (face emotion analysis service)"
);

/// Prefix for environment variable overrides of `ServiceConfig`
pub const ENV_PREFIX: &str = "TOPIC_FACES_";
