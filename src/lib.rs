pub mod concurrency;
pub mod config;
pub mod detect;
pub mod discovery;
pub mod fetch;
pub mod http;
pub mod jobs;
pub mod utils;

pub use concurrency::{ConcurrencyLimiter, SlotGuard};
pub use config::{ConfigError, ServiceConfig};
pub use detect::{
    DetectError, DetectionRunner, Detector, FaceRecord, Likelihood, RawFaceAnnotation,
    VisionDetector,
};
pub use discovery::{ContentDiscovery, DiscoveryError, ImagePair, TopicSite, Wikipedia};
pub use fetch::{ContentSource, FetchError, HttpContentSource, RetryPolicy, RetryingFetcher};
pub use jobs::{AdmissionError, Job, JobManager, JobRequest, JobSnapshot, ProgressSnapshot};
