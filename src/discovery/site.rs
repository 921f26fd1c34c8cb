//! Content source layout and parsing boundary

use serde::{Deserialize, Serialize};

/// An image reference found on a topic's page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePair {
    pub topic: String,
    pub image: String,
}

impl ImagePair {
    pub fn new(topic: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            image: image.into(),
        }
    }
}

/// A fetched payload did not have the expected shape
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Where topic content lives and how to read it
///
/// Implementations are pure: they build URLs and parse bodies, the fetching
/// is done by `RetryingFetcher`.
pub trait TopicSite: Send + Sync {
    /// URL of the rendered page for `topic`
    fn page_url(&self, topic: &str) -> String;

    /// URL of the list of topics linked from `topic`
    fn links_url(&self, topic: &str) -> String;

    /// Image references on a fetched page, in page order without duplicates
    ///
    /// # Errors
    /// Fails when the body is not a page payload.
    fn image_refs(&self, body: &str) -> Result<Vec<String>, ParseError>;

    /// Topic names in a fetched link list, bounded by the site's limit
    ///
    /// # Errors
    /// Fails when the body is not a link list payload.
    fn related_topics(&self, body: &str) -> Result<Vec<String>, ParseError>;
}
