//! Collaborator boundary for the content source
//!
//! The core never talks to the network directly; it asks a `ContentSource`
//! for the body behind a URL and leaves transport details (TLS, redirects,
//! enforcing the timeout) to the implementation.

use futures::future::BoxFuture;
use std::time::Duration;

use super::errors::FetchError;

/// Fetch-by-URL capability
///
/// Implementations must give up after roughly `timeout`; the retry loop
/// relies on every call finishing in bounded time.
pub trait ContentSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, Result<String, FetchError>>;
}
