//! Collaborator boundary for the face detector

use futures::future::BoxFuture;
use std::time::Duration;

use super::likelihood::RawFaceAnnotation;

/// Failure of a single detector call
#[derive(Debug, Clone, thiserror::Error)]
pub enum DetectError {
    #[error("Detection request for {image} failed: {reason}")]
    Request { image: String, reason: String },

    #[error("Detection for {image} timed out after {timeout_ms} ms")]
    Timeout { image: String, timeout_ms: u64 },

    #[error("Detector returned an unreadable response for {image}: {reason}")]
    Malformed { image: String, reason: String },
}

/// Face detection capability
///
/// Implementations enforce `timeout` themselves. An image without faces is
/// `Ok(vec![])`, not an error.
pub trait Detector: Send + Sync {
    fn detect<'a>(
        &'a self,
        image_url: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<Vec<RawFaceAnnotation>, DetectError>>;
}
