//! Error types for content fetches

/// Failure of a single fetch or of a whole retried fetch
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or non-success response
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The content source gave up waiting for the response
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// Every attempt failed; carries the last failure
    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted {
        url: String,
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl FetchError {
    pub fn request(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// URL the failed fetch was aimed at
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. } | Self::Timeout { url, .. } | Self::Exhausted { url, .. } => {
                url
            }
        }
    }

    /// The failure that ended the fetch, looking through `Exhausted`
    #[must_use]
    pub fn last_failure(&self) -> &FetchError {
        match self {
            Self::Exhausted { last, .. } => last.last_failure(),
            other => other,
        }
    }
}
